//! Users Repository

use std::str::FromStr;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::users::models::{Role, User, UserUuid};

const FIND_USER_BY_UUID_SQL: &str = include_str!("sql/find_user_by_uuid.sql");
const GET_USER_ROLE_SQL: &str = include_str!("sql/get_user_role.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsersRepository;

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_user_by_uuid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: UserUuid,
    ) -> Result<Option<User>, sqlx::Error> {
        query_as::<Postgres, User>(FIND_USER_BY_UUID_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_user_role(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: UserUuid,
    ) -> Result<Option<Role>, sqlx::Error> {
        let row = query(GET_USER_ROLE_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| try_get_role(&row, "role")).transpose()
    }
}

pub(crate) fn try_get_role(row: &PgRow, column: &str) -> sqlx::Result<Role> {
    let raw: String = row.try_get(column)?;

    Role::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: try_get_role(row, "role")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
