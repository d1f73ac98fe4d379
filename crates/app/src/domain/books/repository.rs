//! Books Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::try_get_price,
    domain::books::models::{Book, BookUuid, NewBook},
};

const FIND_BOOK_BY_UUID_SQL: &str = include_str!("sql/find_book_by_uuid.sql");
const FIND_BOOK_BY_SLUG_SQL: &str = include_str!("sql/find_book_by_slug.sql");
const CREATE_BOOK_SQL: &str = include_str!("sql/create_book.sql");
const UPDATE_BOOK_PRICE_SQL: &str = include_str!("sql/update_book_price.sql");
const DELETE_BOOK_SQL: &str = include_str!("sql/delete_book.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBooksRepository;

impl PgBooksRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_book_by_uuid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: BookUuid,
    ) -> Result<Option<Book>, sqlx::Error> {
        query_as::<Postgres, Book>(FIND_BOOK_BY_UUID_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_book_by_slug(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        slug: &str,
    ) -> Result<Option<Book>, sqlx::Error> {
        query_as::<Postgres, Book>(FIND_BOOK_BY_SLUG_SQL)
            .bind(slug)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: &NewBook,
        price_minor: i64,
    ) -> Result<Book, sqlx::Error> {
        query_as::<Postgres, Book>(CREATE_BOOK_SQL)
            .bind(book.uuid.into_uuid())
            .bind(&book.slug)
            .bind(&book.title)
            .bind(price_minor)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_book_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: BookUuid,
        price_minor: i64,
    ) -> Result<Option<Book>, sqlx::Error> {
        query_as::<Postgres, Book>(UPDATE_BOOK_PRICE_SQL)
            .bind(uuid.into_uuid())
            .bind(price_minor)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn soft_delete_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: BookUuid,
    ) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_BOOK_SQL)
            .bind(uuid.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

impl<'r> FromRow<'r, PgRow> for Book {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: BookUuid::from_uuid(row.try_get("uuid")?),
            slug: row.try_get("slug")?,
            title: row.try_get("title")?,
            price: try_get_price(row, "price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
