//! Users

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub(crate) use repository::PgUsersRepository;

pub use errors::UsersServiceError;
pub use service::*;
