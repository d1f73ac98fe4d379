//! Book Models

use folio::prices::Price;
use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Book UUID
pub type BookUuid = TypedUuid<Book>;

/// Book Model
#[derive(Debug, Clone)]
pub struct Book {
    pub uuid: BookUuid,
    pub slug: String,
    pub title: String,
    pub price: Price,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// New Book Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub uuid: BookUuid,
    pub slug: String,
    pub title: String,
    pub price: Price,
}

/// A book reference as supplied by the client: either an id or a slug.
#[derive(Debug, Clone, PartialEq)]
pub enum BookRef {
    Uuid(BookUuid),
    Slug(String),
}

/// Denormalized book view embedded in line-item responses. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BookSummary {
    pub uuid: BookUuid,
    pub slug: String,
    pub title: String,
    pub price: Price,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            uuid: book.uuid,
            slug: book.slug.clone(),
            title: book.title.clone(),
            price: book.price,
        }
    }
}
