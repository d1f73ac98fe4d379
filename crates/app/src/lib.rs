//! Folio application domain and persistence modules.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod response;
pub mod uuids;

#[cfg(test)]
mod test;
