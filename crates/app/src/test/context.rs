//! Test context for service-level integration tests.

use folio::prices::Price;
use sqlx::{Row, query};

use crate::{
    database::Db,
    domain::{
        books::{
            BooksService, PgBooksService,
            models::{Book, BookUuid, NewBook},
        },
        carts::PgCartsService,
        orders::{
            PgOrdersService,
            models::{AddressUuid, OrderUuid},
        },
        users::models::UserUuid,
    },
    test::db::TestDb,
};

pub(crate) struct TestContext {
    pub db: TestDb,
    pub books: PgBooksService,
    pub orders: PgOrdersService,
    pub carts: PgCartsService,
}

impl TestContext {
    pub(crate) async fn new() -> Self {
        let db = TestDb::new().await;
        let app_db = Db::new(db.pool().clone());

        Self {
            books: PgBooksService::new(app_db.clone()),
            orders: PgOrdersService::new(app_db.clone()),
            carts: PgCartsService::new(app_db),
            db,
        }
    }

    /// Seeds a customer; the name doubles as the (unique) email local part.
    pub(crate) async fn create_user(&self, name: &str) -> UserUuid {
        let uuid = UserUuid::generate();

        query("INSERT INTO users (uuid, name, email, role) VALUES ($1, $2, $3, 'CUSTOMER')")
            .bind(uuid.into_uuid())
            .bind(name)
            .bind(format!("{name}@example.com"))
            .execute(self.db.pool())
            .await
            .expect("failed to seed user");

        uuid
    }

    pub(crate) async fn create_address(&self, user: UserUuid) -> AddressUuid {
        let uuid = AddressUuid::generate();

        query(
            "INSERT INTO shipping_addresses (uuid, user_uuid, line1, city, postcode, country)
             VALUES ($1, $2, '1 Test Street', 'Testville', 'TE5 7PC', 'GB')",
        )
        .bind(uuid.into_uuid())
        .bind(user.into_uuid())
        .execute(self.db.pool())
        .await
        .expect("failed to seed shipping address");

        uuid
    }

    pub(crate) async fn create_book(&self, slug: &str, price_minor: u64) -> Book {
        self.books
            .create_book(NewBook {
                uuid: BookUuid::generate(),
                slug: slug.to_string(),
                title: format!("Book {slug}"),
                price: Price::from_minor(price_minor),
            })
            .await
            .expect("failed to seed book")
    }

    /// Reads the persisted order totals straight from storage.
    pub(crate) async fn order_totals(&self, order: OrderUuid) -> (i64, i64) {
        let row = query("SELECT subtotal, grand_total FROM orders WHERE uuid = $1")
            .bind(order.into_uuid())
            .fetch_one(self.db.pool())
            .await
            .expect("failed to read order totals");

        (
            row.try_get("subtotal").expect("subtotal column"),
            row.try_get("grand_total").expect("grand_total column"),
        )
    }
}
