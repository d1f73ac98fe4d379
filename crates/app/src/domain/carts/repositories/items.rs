//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::try_get_price,
    domain::{
        books::models::{BookSummary, BookUuid},
        carts::models::{CartItem, CartItemDetail, CartItemUuid, CartUuid},
        users::models::UserUuid,
    },
    uuids::TypedUuid,
};

const FIND_ITEM_BY_BOOK_SQL: &str = include_str!("../sql/find_cart_item_by_book.sql");
const CREATE_CART_ITEM_SQL: &str = include_str!("../sql/create_cart_item.sql");
const FIND_ITEM_FOR_USER_SQL: &str = include_str!("../sql/find_cart_item_for_user.sql");
const GET_ITEM_DETAIL_SQL: &str = include_str!("../sql/get_cart_item_detail.sql");
const UPDATE_CART_ITEM_SQL: &str = include_str!("../sql/update_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const SEARCH_CART_ITEMS_SQL: &str = include_str!("../sql/search_cart_items.sql");
const COUNT_CART_ITEMS_SQL: &str = include_str!("../sql/count_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Uniqueness probe for the (cart, book) pair.
    pub(crate) async fn find_item_by_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        book: BookUuid,
    ) -> Result<Option<CartItemUuid>, sqlx::Error> {
        let row = query(FIND_ITEM_BY_BOOK_SQL)
            .bind(cart.into_uuid())
            .bind(book.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| row.try_get("uuid").map(TypedUuid::from_uuid))
            .transpose()
    }

    pub(crate) async fn create_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: CartItemUuid,
        cart: CartUuid,
        book: BookUuid,
        qty: u32,
        price_snapshot_minor: i64,
        note: Option<&str>,
    ) -> Result<CartItem, sqlx::Error> {
        query_as::<Postgres, CartItem>(CREATE_CART_ITEM_SQL)
            .bind(uuid.into_uuid())
            .bind(cart.into_uuid())
            .bind(book.into_uuid())
            .bind(i64::from(qty))
            .bind(price_snapshot_minor)
            .bind(note)
            .fetch_one(&mut **tx)
            .await
    }

    /// Lookup scoped to the owning user; other users' items are invisible.
    pub(crate) async fn find_item_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        user: UserUuid,
    ) -> Result<Option<CartItem>, sqlx::Error> {
        query_as::<Postgres, CartItem>(FIND_ITEM_FOR_USER_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_item_detail(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        user: UserUuid,
    ) -> Result<Option<CartItemDetail>, sqlx::Error> {
        query_as::<Postgres, CartItemDetail>(GET_ITEM_DETAIL_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn update_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        user: UserUuid,
        book: BookUuid,
        qty: u32,
        price_snapshot_minor: i64,
        note: Option<&str>,
    ) -> Result<Option<CartItem>, sqlx::Error> {
        query_as::<Postgres, CartItem>(UPDATE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .bind(book.into_uuid())
            .bind(i64::from(qty))
            .bind(price_snapshot_minor)
            .bind(note)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Cart item removal is a hard delete.
    pub(crate) async fn delete_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    pub(crate) async fn search_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CartItemDetail>, sqlx::Error> {
        query_as::<Postgres, CartItemDetail>(SEARCH_CART_ITEMS_SQL)
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
        let row = query(COUNT_CART_ITEMS_SQL)
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

fn try_get_qty(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let raw: i64 = row.try_get(column)?;

    u32::try_from(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for CartItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TypedUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: TypedUuid::from_uuid(row.try_get("cart_uuid")?),
            book_uuid: TypedUuid::from_uuid(row.try_get("book_uuid")?),
            qty: try_get_qty(row, "qty")?,
            price_snapshot: try_get_price(row, "price_snapshot")?,
            note: row.try_get("note")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemDetail {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let item = CartItem {
            uuid: TypedUuid::from_uuid(row.try_get("item_uuid")?),
            cart_uuid: TypedUuid::from_uuid(row.try_get("cart_uuid")?),
            book_uuid: TypedUuid::from_uuid(row.try_get("book_uuid")?),
            qty: try_get_qty(row, "qty")?,
            price_snapshot: try_get_price(row, "price_snapshot")?,
            note: row.try_get("note")?,
            created_at: row.try_get::<SqlxTimestamp, _>("item_created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("item_updated_at")?.to_jiff(),
        };

        let book = BookSummary {
            uuid: item.book_uuid,
            slug: row.try_get("book_slug")?,
            title: row.try_get("book_title")?,
            price: try_get_price(row, "book_price")?,
        };

        Ok(Self { item, book })
    }
}
