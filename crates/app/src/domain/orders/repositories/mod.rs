//! Order Repositories

mod items;
mod orders;

pub(crate) use items::{MinorSnapshot, PgOrderItemsRepository};
pub(crate) use orders::PgOrdersRepository;
