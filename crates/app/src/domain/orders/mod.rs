//! Orders

pub mod data;
pub mod errors;
pub mod models;
mod repositories;
pub mod service;

pub(crate) use repositories::{MinorSnapshot, PgOrderItemsRepository, PgOrdersRepository};

pub use errors::OrdersServiceError;
pub use service::*;
