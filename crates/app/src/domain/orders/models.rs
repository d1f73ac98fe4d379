//! Order Models

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use folio::prices::Price;
use jiff::Timestamp;

use crate::{
    domain::{books::models::BookSummary, users::models::UserUuid},
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItem>;

/// Shipping address marker; address records are managed outside this crate.
#[derive(Debug, Clone, Copy)]
pub struct ShippingAddress;

/// Shipping Address UUID
pub type AddressUuid = TypedUuid<ShippingAddress>;

/// Order lifecycle status. Only `Created` is mutable here; later
/// transitions are driven by external processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Created,
    Paid,
    Failed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized status strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CREATED" => Ok(Self::Created),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// Order Model
#[derive(Debug, Clone)]
pub struct Order {
    pub uuid: OrderUuid,
    pub code: String,
    pub user_uuid: UserUuid,
    pub shipping_address_uuid: AddressUuid,
    pub status: OrderStatus,
    pub subtotal: Price,
    pub shipping_cost: Price,
    pub discount_total: Price,
    pub grand_total: Price,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// OrderItem Model
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub book_uuid: crate::domain::books::models::BookUuid,
    pub qty: u32,
    pub title_snapshot: String,
    pub price_snapshot: Price,
    pub line_total: Price,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Denormalized order view embedded in line-item responses. Never persisted.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub uuid: OrderUuid,
    pub code: String,
    pub shipping_address_uuid: AddressUuid,
    pub status: OrderStatus,
    pub subtotal: Price,
    pub shipping_cost: Price,
    pub discount_total: Price,
    pub grand_total: Price,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            uuid: order.uuid,
            code: order.code.clone(),
            shipping_address_uuid: order.shipping_address_uuid,
            status: order.status,
            subtotal: order.subtotal,
            shipping_cost: order.shipping_cost,
            discount_total: order.discount_total,
            grand_total: order.grand_total,
        }
    }
}

/// An order item enriched with its book and parent order summaries.
#[derive(Debug, Clone)]
pub struct OrderItemDetail {
    pub item: OrderItem,
    pub book: BookSummary,
    pub order: OrderSummary,
}
