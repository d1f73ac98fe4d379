//! Database connection management

use folio::prices::Price;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// Every multi-statement service operation runs inside one so a
    /// read-then-write sequence never interleaves with a concurrent
    /// mutation of the same row.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Decodes a `BIGINT` money column into a [`Price`], rejecting negatives
/// at the storage boundary.
pub(crate) fn try_get_price(row: &PgRow, column: &str) -> sqlx::Result<Price> {
    let raw: i64 = row.try_get(column)?;

    let minor = u64::try_from(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })?;

    Ok(Price::from_minor(minor))
}
