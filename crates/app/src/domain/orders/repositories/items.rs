//! Order Items Repository

use folio::prices::Price;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::try_get_price,
    domain::{
        books::models::{BookSummary, BookUuid},
        orders::models::{
            OrderItem, OrderItemDetail, OrderItemUuid, OrderSummary, OrderUuid,
        },
        users::models::UserUuid,
    },
    uuids::TypedUuid,
};

use super::orders::try_get_status;

const FIND_LIVE_ITEM_BY_BOOK_SQL: &str = include_str!("../sql/find_live_order_item_by_book.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("../sql/create_order_item.sql");
const FIND_ITEM_FOR_USER_SQL: &str = include_str!("../sql/find_order_item_for_user.sql");
const GET_ITEM_DETAIL_SQL: &str = include_str!("../sql/get_order_item_detail.sql");
const UPDATE_ORDER_ITEM_SQL: &str = include_str!("../sql/update_order_item.sql");
const DELETE_ORDER_ITEM_SQL: &str = include_str!("../sql/delete_order_item.sql");
const LIST_LIVE_LINE_TOTALS_SQL: &str = include_str!("../sql/list_live_line_totals.sql");
const SEARCH_ORDER_ITEMS_SQL: &str = include_str!("../sql/search_order_items.sql");
const COUNT_ORDER_ITEMS_SQL: &str = include_str!("../sql/count_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Live-item uniqueness probe for the (order, book) pair.
    pub(crate) async fn find_live_item_by_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        book: BookUuid,
    ) -> Result<Option<OrderItemUuid>, sqlx::Error> {
        let row = query(FIND_LIVE_ITEM_BY_BOOK_SQL)
            .bind(order.into_uuid())
            .bind(book.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| row.try_get("uuid").map(TypedUuid::from_uuid))
            .transpose()
    }

    pub(crate) async fn create_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: OrderItemUuid,
        order: OrderUuid,
        book: BookUuid,
        qty: u32,
        snapshot: &MinorSnapshot<'_>,
    ) -> Result<OrderItem, sqlx::Error> {
        query_as::<Postgres, OrderItem>(CREATE_ORDER_ITEM_SQL)
            .bind(uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(book.into_uuid())
            .bind(i64::from(qty))
            .bind(snapshot.title)
            .bind(snapshot.price_snapshot_minor)
            .bind(snapshot.line_total_minor)
            .fetch_one(&mut **tx)
            .await
    }

    /// Lookup scoped to the owning user; other users' items are invisible.
    pub(crate) async fn find_item_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: OrderItemUuid,
        user: UserUuid,
    ) -> Result<Option<OrderItem>, sqlx::Error> {
        query_as::<Postgres, OrderItem>(FIND_ITEM_FOR_USER_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_item_detail(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: OrderItemUuid,
        user: UserUuid,
    ) -> Result<Option<OrderItemDetail>, sqlx::Error> {
        query_as::<Postgres, OrderItemDetail>(GET_ITEM_DETAIL_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn update_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: OrderItemUuid,
        user: UserUuid,
        book: BookUuid,
        qty: u32,
        snapshot: &MinorSnapshot<'_>,
    ) -> Result<Option<OrderItem>, sqlx::Error> {
        query_as::<Postgres, OrderItem>(UPDATE_ORDER_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .bind(book.into_uuid())
            .bind(i64::from(qty))
            .bind(snapshot.title)
            .bind(snapshot.price_snapshot_minor)
            .bind(snapshot.line_total_minor)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn soft_delete_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: OrderItemUuid,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_ORDER_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    pub(crate) async fn list_live_line_totals(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<Price>, sqlx::Error> {
        let rows = query(LIST_LIVE_LINE_TOTALS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| try_get_price(row, "line_total"))
            .collect()
    }

    pub(crate) async fn search_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderItemDetail>, sqlx::Error> {
        query_as::<Postgres, OrderItemDetail>(SEARCH_ORDER_ITEMS_SQL)
            .bind(user.into_uuid())
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let row = query(COUNT_ORDER_ITEMS_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        let total: i64 = row.try_get("total")?;

        u64::try_from(total).map_err(|e| sqlx::Error::ColumnDecode {
            index: "total".to_string(),
            source: Box::new(e),
        })
    }
}

/// A snapshot with its money already converted to BIGINT minor units;
/// the service performs the checked conversion before persisting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MinorSnapshot<'a> {
    pub title: &'a str,
    pub price_snapshot_minor: i64,
    pub line_total_minor: i64,
}

fn try_get_qty(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let raw: i64 = row.try_get(column)?;

    u32::try_from(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TypedUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: TypedUuid::from_uuid(row.try_get("order_uuid")?),
            book_uuid: TypedUuid::from_uuid(row.try_get("book_uuid")?),
            qty: try_get_qty(row, "qty")?,
            title_snapshot: row.try_get("title_snapshot")?,
            price_snapshot: try_get_price(row, "price_snapshot")?,
            line_total: try_get_price(row, "line_total")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemDetail {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let item = OrderItem {
            uuid: TypedUuid::from_uuid(row.try_get("item_uuid")?),
            order_uuid: TypedUuid::from_uuid(row.try_get("order_uuid")?),
            book_uuid: TypedUuid::from_uuid(row.try_get("book_uuid")?),
            qty: try_get_qty(row, "qty")?,
            title_snapshot: row.try_get("title_snapshot")?,
            price_snapshot: try_get_price(row, "price_snapshot")?,
            line_total: try_get_price(row, "line_total")?,
            created_at: row.try_get::<SqlxTimestamp, _>("item_created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("item_updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("item_deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        };

        let book = BookSummary {
            uuid: item.book_uuid,
            slug: row.try_get("book_slug")?,
            title: row.try_get("book_title")?,
            price: try_get_price(row, "book_price")?,
        };

        let order = OrderSummary {
            uuid: item.order_uuid,
            code: row.try_get("order_code")?,
            shipping_address_uuid: TypedUuid::from_uuid(row.try_get("shipping_address_uuid")?),
            status: try_get_status(row, "order_status")?,
            subtotal: try_get_price(row, "subtotal")?,
            shipping_cost: try_get_price(row, "shipping_cost")?,
            discount_total: try_get_price(row, "discount_total")?,
            grand_total: try_get_price(row, "grand_total")?,
        };

        Ok(Self { item, book, order })
    }
}
