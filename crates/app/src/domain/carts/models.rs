//! Cart Models

use folio::prices::Price;
use jiff::Timestamp;

use crate::{
    domain::{books::models::{BookSummary, BookUuid}, users::models::UserUuid},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Cart Model
///
/// One active cart per user, created lazily on first add.
#[derive(Debug, Clone)]
pub struct Cart {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// CartItem Model
///
/// `price_snapshot` is the quantity-scaled amount frozen when the item
/// was added or last updated, not the unit price.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub book_uuid: BookUuid,
    pub qty: u32,
    pub price_snapshot: Price,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cart item enriched with its book summary. Never persisted.
#[derive(Debug, Clone)]
pub struct CartItemDetail {
    pub item: CartItem,
    pub book: BookSummary,
}
