//! Domain modules

pub mod books;
pub mod carts;
pub mod orders;
pub mod users;
pub mod vouchers;
