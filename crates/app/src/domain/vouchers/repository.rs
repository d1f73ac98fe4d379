//! Vouchers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::try_get_price,
    domain::{
        users::models::UserUuid,
        vouchers::{
            data::NewUserVoucher,
            models::{UserVoucher, UserVoucherUuid, Voucher, VoucherUuid},
        },
    },
    uuids::TypedUuid,
};

const FIND_VOUCHER_BY_CODE_SQL: &str = include_str!("sql/find_voucher_by_code.sql");
const FIND_VOUCHER_BY_UUID_SQL: &str = include_str!("sql/find_voucher_by_uuid.sql");
const FIND_LIVE_ASSIGNMENT_SQL: &str = include_str!("sql/find_live_user_voucher.sql");
const CREATE_USER_VOUCHER_SQL: &str = include_str!("sql/create_user_voucher.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVouchersRepository;

impl PgVouchersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_voucher_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<Voucher>, sqlx::Error> {
        query_as::<Postgres, Voucher>(FIND_VOUCHER_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_voucher_by_uuid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
    ) -> Result<Option<Voucher>, sqlx::Error> {
        query_as::<Postgres, Voucher>(FIND_VOUCHER_BY_UUID_SQL)
            .bind(voucher.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Live-assignment uniqueness probe for the (user, voucher) pair.
    pub(crate) async fn find_live_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        voucher: VoucherUuid,
    ) -> Result<Option<UserVoucherUuid>, sqlx::Error> {
        let row = query(FIND_LIVE_ASSIGNMENT_SQL)
            .bind(user.into_uuid())
            .bind(voucher.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| row.try_get("uuid").map(TypedUuid::from_uuid))
            .transpose()
    }

    pub(crate) async fn create_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        assignment: &NewUserVoucher,
    ) -> Result<UserVoucher, sqlx::Error> {
        query_as::<Postgres, UserVoucher>(CREATE_USER_VOUCHER_SQL)
            .bind(assignment.uuid.into_uuid())
            .bind(assignment.user_uuid.into_uuid())
            .bind(assignment.voucher_uuid.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

fn try_get_u32(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let raw: i64 = row.try_get(column)?;

    u32::try_from(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for Voucher {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TypedUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            percentage: try_get_u32(row, "percentage")?,
            upper_limit: try_get_price(row, "upper_limit")?,
            valid_from: row.try_get::<SqlxTimestamp, _>("valid_from")?.to_jiff(),
            valid_until: row.try_get::<SqlxTimestamp, _>("valid_until")?.to_jiff(),
            all_user: row.try_get("all_user")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for UserVoucher {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TypedUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: TypedUuid::from_uuid(row.try_get("user_uuid")?),
            voucher_uuid: TypedUuid::from_uuid(row.try_get("voucher_uuid")?),
            usage_count: try_get_u32(row, "usage_count")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
