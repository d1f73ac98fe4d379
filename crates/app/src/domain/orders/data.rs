//! Order Data

use crate::domain::{
    books::models::BookUuid,
    orders::models::{AddressUuid, OrderItemUuid, OrderUuid},
    users::models::UserUuid,
};

/// New Order Data; totals start zeroed and status starts at CREATED.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewOrder {
    pub uuid: OrderUuid,
    pub code: String,
    pub user_uuid: UserUuid,
    pub shipping_address_uuid: AddressUuid,
}

/// New Order Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub uuid: OrderItemUuid,
    pub book_uuid: BookUuid,
    pub qty: u32,
    pub shipping_address_uuid: AddressUuid,
}

/// Order Item Update Data. A differing `book_uuid` re-snapshots price
/// and title; `None` (or the same book) keeps the stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOrderItem {
    pub book_uuid: Option<BookUuid>,
    pub qty: u32,
}
