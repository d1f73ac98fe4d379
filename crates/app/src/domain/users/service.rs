//! Users service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::users::{
        PgUsersRepository,
        errors::UsersServiceError,
        models::{Role, User, UserUuid},
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn get_user(&self, uuid: UserUuid) -> Result<User, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let user = self.repository.find_user_by_uuid(&mut tx, uuid).await?;

        tx.commit().await?;

        user.ok_or(UsersServiceError::NotFound)
    }

    async fn get_role(&self, uuid: UserUuid) -> Result<Role, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let role = self.repository.get_user_role(&mut tx, uuid).await?;

        tx.commit().await?;

        role.ok_or(UsersServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Retrieve a single live user.
    async fn get_user(&self, uuid: UserUuid) -> Result<User, UsersServiceError>;

    /// Resolve the caller's current role with a fresh lookup; roles are
    /// never trusted from a cached token claim.
    async fn get_role(&self, uuid: UserUuid) -> Result<Role, UsersServiceError>;
}
