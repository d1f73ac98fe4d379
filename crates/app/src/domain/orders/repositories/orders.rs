//! Orders Repository

use std::str::FromStr;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::try_get_price,
    domain::{
        orders::{
            data::NewOrder,
            models::{AddressUuid, Order, OrderStatus, OrderUuid},
        },
        users::models::UserUuid,
    },
    uuids::TypedUuid,
};

const FIND_OPEN_ORDER_SQL: &str = include_str!("../sql/find_open_order.sql");
const FIND_ORDER_BY_UUID_SQL: &str = include_str!("../sql/find_order_by_uuid.sql");
const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const UPDATE_ORDER_ADDRESS_SQL: &str = include_str!("../sql/update_order_shipping_address.sql");
const UPDATE_ORDER_TOTALS_SQL: &str = include_str!("../sql/update_order_totals.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_open_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(FIND_OPEN_ORDER_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_order_by_uuid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: OrderUuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(FIND_ORDER_BY_UUID_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Conditional insert of a fresh open order. Returns `None` when a
    /// concurrent request won the open-order slot first (the partial
    /// unique index turns the race into a no-op insert).
    pub(crate) async fn create_open_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<Option<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(&order.code)
            .bind(order.user_uuid.into_uuid())
            .bind(order.shipping_address_uuid.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn update_shipping_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: OrderUuid,
        address: AddressUuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(UPDATE_ORDER_ADDRESS_SQL)
            .bind(uuid.into_uuid())
            .bind(address.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn update_totals(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: OrderUuid,
        subtotal_minor: i64,
        grand_total_minor: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = query(UPDATE_ORDER_TOTALS_SQL)
            .bind(uuid.into_uuid())
            .bind(subtotal_minor)
            .bind(grand_total_minor)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

pub(crate) fn try_get_status(row: &PgRow, column: &str) -> sqlx::Result<OrderStatus> {
    let raw: String = row.try_get(column)?;

    OrderStatus::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TypedUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            user_uuid: TypedUuid::from_uuid(row.try_get("user_uuid")?),
            shipping_address_uuid: TypedUuid::from_uuid(row.try_get("shipping_address_uuid")?),
            status: try_get_status(row, "status")?,
            subtotal: try_get_price(row, "subtotal")?,
            shipping_cost: try_get_price(row, "shipping_cost")?,
            discount_total: try_get_price(row, "discount_total")?,
            grand_total: try_get_price(row, "grand_total")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
