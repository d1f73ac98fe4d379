//! Cart write payloads.

use crate::domain::{books::models::BookUuid, carts::models::CartItemUuid};

#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub uuid: CartItemUuid,
    pub book_uuid: BookUuid,
    pub qty: u32,
    pub note: Option<String>,
}

/// `book_uuid` swaps the item to a different book. `note` always
/// replaces the stored note; `None` clears it.
#[derive(Debug, Clone)]
pub struct UpdateCartItem {
    pub book_uuid: Option<BookUuid>,
    pub qty: u32,
    pub note: Option<String>,
}
