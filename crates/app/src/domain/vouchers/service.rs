//! Vouchers service.

use async_trait::async_trait;
use mockall::automock;
use tracing::warn;

use crate::{
    database::Db,
    domain::{
        users::PgUsersRepository,
        vouchers::{
            PgVouchersRepository,
            data::NewUserVoucher,
            errors::VouchersServiceError,
            models::{UserVoucher, Voucher},
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgVouchersService {
    db: Db,
    vouchers_repository: PgVouchersRepository,
    users_repository: PgUsersRepository,
}

impl PgVouchersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            vouchers_repository: PgVouchersRepository::new(),
            users_repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl VouchersService for PgVouchersService {
    async fn get_voucher(&self, code: &str) -> Result<Voucher, VouchersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let voucher = self
            .vouchers_repository
            .find_voucher_by_code(&mut tx, code)
            .await?
            .ok_or(VouchersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(voucher)
    }

    async fn assign(
        &self,
        assignment: NewUserVoucher,
    ) -> Result<UserVoucher, VouchersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let voucher = self
            .vouchers_repository
            .find_voucher_by_uuid(&mut tx, assignment.voucher_uuid)
            .await?;

        if voucher.is_none() {
            warn!(voucher = %assignment.voucher_uuid, "voucher assignment rejected; voucher does not exist");

            return Err(VouchersServiceError::NotFound);
        }

        if self
            .users_repository
            .find_user_by_uuid(&mut tx, assignment.user_uuid)
            .await?
            .is_none()
        {
            warn!(user = %assignment.user_uuid, "voucher assignment rejected; user does not exist");

            return Err(VouchersServiceError::UserNotFound);
        }

        if self
            .vouchers_repository
            .find_live_assignment(&mut tx, assignment.user_uuid, assignment.voucher_uuid)
            .await?
            .is_some()
        {
            warn!(
                user = %assignment.user_uuid,
                voucher = %assignment.voucher_uuid,
                "voucher assignment rejected; already assigned"
            );

            return Err(VouchersServiceError::AlreadyExists);
        }

        let created = self
            .vouchers_repository
            .create_assignment(&mut tx, &assignment)
            .await?;

        tx.commit().await?;

        Ok(created)
    }
}

#[automock]
#[async_trait]
pub trait VouchersService: Send + Sync {
    /// Looks up a live voucher by its public code.
    async fn get_voucher(&self, code: &str) -> Result<Voucher, VouchersServiceError>;

    /// Grants a voucher to a user. Both sides must exist, and a user
    /// holds at most one live assignment per voucher.
    async fn assign(&self, assignment: NewUserVoucher)
        -> Result<UserVoucher, VouchersServiceError>;
}
