//! Books service.

use async_trait::async_trait;
use folio::prices::Price;
use mockall::automock;

use crate::{
    database::Db,
    domain::books::{
        PgBooksRepository,
        errors::BooksServiceError,
        models::{Book, BookRef, BookUuid, NewBook},
    },
};

#[derive(Debug, Clone)]
pub struct PgBooksService {
    db: Db,
    repository: PgBooksRepository,
}

impl PgBooksService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgBooksRepository::new(),
        }
    }
}

#[async_trait]
impl BooksService for PgBooksService {
    async fn get_book(&self, book: BookRef) -> Result<Book, BooksServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let found = match &book {
            BookRef::Uuid(uuid) => self.repository.find_book_by_uuid(&mut tx, *uuid).await?,
            BookRef::Slug(slug) => self.repository.find_book_by_slug(&mut tx, slug).await?,
        };

        tx.commit().await?;

        found.ok_or(BooksServiceError::NotFound)
    }

    async fn create_book(&self, book: NewBook) -> Result<Book, BooksServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let price_minor = i64::try_from(book.price.minor())?;
        let created = self.repository.create_book(&mut tx, &book, price_minor).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_price(&self, uuid: BookUuid, price: Price) -> Result<Book, BooksServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let price_minor = i64::try_from(price.minor())?;
        let updated = self
            .repository
            .update_book_price(&mut tx, uuid, price_minor)
            .await?
            .ok_or(BooksServiceError::NotFound)?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_book(&self, uuid: BookUuid) -> Result<(), BooksServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.repository.soft_delete_book(&mut tx, uuid).await?;

        if rows_affected == 0 {
            return Err(BooksServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait BooksService: Send + Sync {
    /// Resolves a live book by id or slug.
    async fn get_book(&self, book: BookRef) -> Result<Book, BooksServiceError>;

    /// Creates a catalog entry. ADMIN-gated at the boundary.
    async fn create_book(&self, book: NewBook) -> Result<Book, BooksServiceError>;

    /// Updates the catalog price. Existing line-item snapshots are
    /// unaffected by design.
    async fn update_price(&self, uuid: BookUuid, price: Price) -> Result<Book, BooksServiceError>;

    /// Tombstones a catalog entry.
    async fn delete_book(&self, uuid: BookUuid) -> Result<(), BooksServiceError>;
}
