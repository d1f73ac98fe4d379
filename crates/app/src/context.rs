//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::AccessGate,
    database::{self, Db},
    domain::{
        books::{BooksService, PgBooksService},
        carts::{CartsService, PgCartsService},
        orders::{OrdersService, PgOrdersService},
        users::{PgUsersService, UsersService},
        vouchers::{PgVouchersService, VouchersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Service handles wired once at process start; handlers receive these
/// explicitly rather than reaching for ambient singletons.
#[derive(Clone)]
pub struct AppContext {
    pub books: Arc<dyn BooksService>,
    pub users: Arc<dyn UsersService>,
    pub orders: Arc<dyn OrdersService>,
    pub carts: Arc<dyn CartsService>,
    pub vouchers: Arc<dyn VouchersService>,
    pub gate: AccessGate,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);
        let users: Arc<dyn UsersService> = Arc::new(PgUsersService::new(db.clone()));

        Ok(Self {
            books: Arc::new(PgBooksService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            vouchers: Arc::new(PgVouchersService::new(db)),
            gate: AccessGate::new(users.clone()),
            users,
        })
    }
}
