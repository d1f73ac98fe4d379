//! Folio
//!
//! Folio's pricing core: money representation, line-item price snapshots,
//! order total arithmetic and pagination math for the bookstore backend.
//! Everything in this crate is pure; persistence lives in `folio-app`.

pub mod pagination;
pub mod prices;
pub mod snapshot;
pub mod totals;
