//! Orders service.
//!
//! Owns the order-level monetary invariant: every line-item mutation
//! re-runs the totals recalculation inside the same transaction, so a
//! subsequent read always observes `grand_total = subtotal +
//! shipping_cost - discount_total` over the live items.

use async_trait::async_trait;
use folio::{
    pagination::{PageOf, PageRequest},
    snapshot::{self, LineSnapshot},
    totals::{self, OrderTotals},
};
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        books::{PgBooksRepository, models::Book},
        orders::{
            MinorSnapshot, PgOrderItemsRepository, PgOrdersRepository,
            data::{NewOrder, NewOrderItem, UpdateOrderItem},
            errors::OrdersServiceError,
            models::{AddressUuid, Order, OrderItem, OrderItemDetail, OrderItemUuid, OrderUuid},
        },
        users::models::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders_repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
    books_repository: PgBooksRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders_repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
            books_repository: PgBooksRepository::new(),
        }
    }

    /// Returns the caller's open (CREATED) order, updating its shipping
    /// address when a different one is supplied, or creates a fresh one.
    ///
    /// At most one open order per user exists; the partial unique index
    /// turns a concurrent create into a lost insert, after which the
    /// winner's row is re-read instead of surfacing an error.
    async fn find_or_create_open_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<Order, OrdersServiceError> {
        if let Some(order) = self.orders_repository.find_open_order(tx, user).await? {
            if order.shipping_address_uuid != address {
                return self
                    .orders_repository
                    .update_shipping_address(tx, order.uuid, address)
                    .await?
                    .ok_or(OrdersServiceError::NotFound);
            }

            return Ok(order);
        }

        let order = NewOrder {
            uuid: OrderUuid::generate(),
            code: order_code(Timestamp::now()),
            user_uuid: user,
            shipping_address_uuid: address,
        };

        if let Some(created) = self.orders_repository.create_open_order(tx, &order).await? {
            return Ok(created);
        }

        self.orders_repository
            .find_open_order(tx, user)
            .await?
            .ok_or(OrdersServiceError::NotFound)
    }

    /// Recomputes subtotal and grand total from the live line items and
    /// persists them. A vanished order is a logged no-op rather than an
    /// error.
    async fn recalculate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<OrderTotals>, OrdersServiceError> {
        let Some(current) = self.orders_repository.find_order_by_uuid(tx, order).await? else {
            debug!(order = %order, "skipping totals recalculation; order no longer exists");

            return Ok(None);
        };

        let line_totals = self.items_repository.list_live_line_totals(tx, order).await?;

        let recalculated =
            totals::recalculate(line_totals, current.shipping_cost, current.discount_total)?;

        self.orders_repository
            .update_totals(
                tx,
                order,
                i64::try_from(recalculated.subtotal.minor())?,
                i64::try_from(recalculated.grand_total.minor())?,
            )
            .await?;

        Ok(Some(recalculated))
    }

    async fn get_detail(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: OrderItemUuid,
        user: UserUuid,
    ) -> Result<OrderItemDetail, OrdersServiceError> {
        self.items_repository
            .get_item_detail(tx, item, user)
            .await?
            .ok_or(OrdersServiceError::NotFound)
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewOrderItem,
    ) -> Result<OrderItemDetail, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let book = self
            .books_repository
            .find_book_by_uuid(&mut tx, item.book_uuid)
            .await?
            .ok_or(OrdersServiceError::BookNotFound)?;

        let order = self
            .find_or_create_open_order(&mut tx, user, item.shipping_address_uuid)
            .await?;

        if self
            .items_repository
            .find_live_item_by_book(&mut tx, order.uuid, book.uuid)
            .await?
            .is_some()
        {
            return Err(OrdersServiceError::AlreadyExists);
        }

        let snapshot = snapshot::snapshot(book.price, &book.title, item.qty)?;

        let created = self
            .items_repository
            .create_item(
                &mut tx,
                item.uuid,
                order.uuid,
                book.uuid,
                item.qty,
                &to_minor(&snapshot)?,
            )
            .await?;

        self.recalculate(&mut tx, order.uuid).await?;

        let detail = self.get_detail(&mut tx, created.uuid, user).await?;

        tx.commit().await?;

        Ok(detail)
    }

    async fn update_item(
        &self,
        user: UserUuid,
        item: OrderItemUuid,
        update: UpdateOrderItem,
    ) -> Result<OrderItemDetail, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self
            .items_repository
            .find_item_for_user(&mut tx, item, user)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let replacement = match update.book_uuid {
            Some(book) if book != current.book_uuid => Some(
                self.books_repository
                    .find_book_by_uuid(&mut tx, book)
                    .await?
                    .ok_or(OrdersServiceError::BookNotFound)?,
            ),
            _ => None,
        };

        let snapshot = refreshed_snapshot(&current, replacement.as_ref(), update.qty)?;
        let book_uuid = replacement.as_ref().map_or(current.book_uuid, |b| b.uuid);

        let updated = self
            .items_repository
            .update_item(&mut tx, item, user, book_uuid, update.qty, &to_minor(&snapshot)?)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        self.recalculate(&mut tx, updated.order_uuid).await?;

        let detail = self.get_detail(&mut tx, updated.uuid, user).await?;

        tx.commit().await?;

        Ok(detail)
    }

    async fn remove_item(
        &self,
        user: UserUuid,
        item: OrderItemUuid,
    ) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self
            .items_repository
            .find_item_for_user(&mut tx, item, user)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let rows_affected = self
            .items_repository
            .soft_delete_item(&mut tx, item, user)
            .await?;

        if rows_affected == 0 {
            return Err(OrdersServiceError::NotFound);
        }

        self.recalculate(&mut tx, current.order_uuid).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn get_item(
        &self,
        user: UserUuid,
        item: OrderItemUuid,
    ) -> Result<OrderItemDetail, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let detail = self.get_detail(&mut tx, item, user).await?;

        tx.commit().await?;

        Ok(detail)
    }

    async fn search_items(
        &self,
        user: UserUuid,
        page: PageRequest,
    ) -> Result<PageOf<OrderItemDetail>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let items = self
            .items_repository
            .search_items(
                &mut tx,
                user,
                i64::try_from(page.per_page())?,
                i64::try_from(page.offset())?,
            )
            .await?;

        let total_items = self.items_repository.count_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(PageOf::new(items, page, total_items))
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Adds a book to the caller's open order, creating the order on
    /// first add. A book already present among the live items is a
    /// conflict, never a merge.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewOrderItem,
    ) -> Result<OrderItemDetail, OrdersServiceError>;

    /// Updates quantity (and optionally the book) of an owned line item.
    async fn update_item(
        &self,
        user: UserUuid,
        item: OrderItemUuid,
        update: UpdateOrderItem,
    ) -> Result<OrderItemDetail, OrdersServiceError>;

    /// Tombstones an owned line item.
    async fn remove_item(
        &self,
        user: UserUuid,
        item: OrderItemUuid,
    ) -> Result<(), OrdersServiceError>;

    /// Retrieves an owned line item with its book and order summaries.
    async fn get_item(
        &self,
        user: UserUuid,
        item: OrderItemUuid,
    ) -> Result<OrderItemDetail, OrdersServiceError>;

    /// Pages through the caller's live order items, newest first.
    async fn search_items(
        &self,
        user: UserUuid,
        page: PageRequest,
    ) -> Result<PageOf<OrderItemDetail>, OrdersServiceError>;
}

/// Human-readable order code, `ORD-<unix millis>`.
fn order_code(now: Timestamp) -> String {
    format!("ORD-{}", now.as_millisecond())
}

/// Picks the snapshot for an item update: a replacement book re-freezes
/// price and title, otherwise the stored snapshot is kept and only the
/// line total is recomputed for the new quantity.
fn refreshed_snapshot(
    current: &OrderItem,
    replacement: Option<&Book>,
    qty: u32,
) -> Result<LineSnapshot, OrdersServiceError> {
    let snapshot = match replacement {
        Some(book) => snapshot::snapshot(book.price, &book.title, qty)?,
        None => snapshot::snapshot(current.price_snapshot, &current.title_snapshot, qty)?,
    };

    Ok(snapshot)
}

fn to_minor(snapshot: &LineSnapshot) -> Result<MinorSnapshot<'_>, OrdersServiceError> {
    Ok(MinorSnapshot {
        title: &snapshot.title_snapshot,
        price_snapshot_minor: i64::try_from(snapshot.unit_price.minor())?,
        line_total_minor: i64::try_from(snapshot.line_total.minor())?,
    })
}

#[cfg(test)]
mod tests {
    use folio::prices::Price;
    use testresult::TestResult;

    use crate::{
        domain::books::{BooksService, models::BookUuid},
        test::TestContext,
        uuids::TypedUuid,
    };

    use super::*;

    fn item_with_snapshot(unit_minor: u64, title: &str) -> OrderItem {
        let now = Timestamp::UNIX_EPOCH;

        OrderItem {
            uuid: TypedUuid::generate(),
            order_uuid: TypedUuid::generate(),
            book_uuid: TypedUuid::generate(),
            qty: 2,
            title_snapshot: title.to_string(),
            price_snapshot: Price::from_minor(unit_minor),
            line_total: Price::from_minor(unit_minor * 2),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn book(price_minor: u64, title: &str) -> Book {
        let now = Timestamp::UNIX_EPOCH;

        Book {
            uuid: BookUuid::generate(),
            slug: "a-book".to_string(),
            title: title.to_string(),
            price: Price::from_minor(price_minor),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn order_codes_carry_the_millisecond_timestamp() {
        let code = order_code(Timestamp::UNIX_EPOCH);

        assert_eq!(code, "ORD-0");
    }

    #[test]
    fn quantity_change_keeps_the_stored_snapshot() -> TestResult {
        let current = item_with_snapshot(5000, "The Name of the Rose");

        let snapshot = refreshed_snapshot(&current, None, 3)?;

        assert_eq!(snapshot.unit_price, Price::from_minor(5000));
        assert_eq!(snapshot.title_snapshot, "The Name of the Rose");
        assert_eq!(snapshot.line_total, Price::from_minor(15_000));

        Ok(())
    }

    #[test]
    fn book_change_refreezes_price_and_title() -> TestResult {
        let current = item_with_snapshot(5000, "The Name of the Rose");
        let replacement = book(7500, "Foucault's Pendulum");

        let snapshot = refreshed_snapshot(&current, Some(&replacement), 2)?;

        assert_eq!(snapshot.unit_price, Price::from_minor(7500));
        assert_eq!(snapshot.title_snapshot, "Foucault's Pendulum");
        assert_eq!(snapshot.line_total, Price::from_minor(15_000));

        Ok(())
    }

    #[test]
    fn zero_quantity_update_is_rejected() {
        let current = item_with_snapshot(5000, "The Name of the Rose");

        let result = refreshed_snapshot(&current, None, 0);

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );
    }

    fn add_request(book: BookUuid, qty: u32, address: AddressUuid) -> NewOrderItem {
        NewOrderItem {
            uuid: TypedUuid::generate(),
            book_uuid: book,
            qty,
            shipping_address_uuid: address,
        }
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn adding_the_same_book_twice_is_a_conflict() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice").await;
        let address = ctx.create_address(user).await;
        let book = ctx.create_book("dune", 5000).await;

        ctx.orders
            .add_item(user, add_request(book.uuid, 1, address))
            .await?;

        let result = ctx
            .orders
            .add_item(user, add_request(book.uuid, 2, address))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn items_of_other_users_are_invisible() -> TestResult {
        let ctx = TestContext::new().await;
        let alice = ctx.create_user("alice").await;
        let bob = ctx.create_user("bob").await;
        let address = ctx.create_address(alice).await;
        let book = ctx.create_book("dune", 5000).await;

        let detail = ctx
            .orders
            .add_item(alice, add_request(book.uuid, 1, address))
            .await?;
        let item = detail.item.uuid;

        let get = ctx.orders.get_item(bob, item).await;
        assert!(
            matches!(get, Err(OrdersServiceError::NotFound)),
            "expected NotFound on cross-user read, got {get:?}"
        );

        let update = ctx
            .orders
            .update_item(
                bob,
                item,
                UpdateOrderItem {
                    book_uuid: None,
                    qty: 3,
                },
            )
            .await;
        assert!(
            matches!(update, Err(OrdersServiceError::NotFound)),
            "expected NotFound on cross-user update, got {update:?}"
        );

        let remove = ctx.orders.remove_item(bob, item).await;
        assert!(
            matches!(remove, Err(OrdersServiceError::NotFound)),
            "expected NotFound on cross-user removal, got {remove:?}"
        );

        // The owner still sees the untouched item.
        let detail = ctx.orders.get_item(alice, item).await?;
        assert_eq!(detail.item.qty, 1);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn totals_follow_add_update_remove() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice").await;
        let address = ctx.create_address(user).await;
        let book = ctx.create_book("dune", 5000).await;

        let detail = ctx
            .orders
            .add_item(user, add_request(book.uuid, 2, address))
            .await?;
        let order = detail.order.uuid;

        assert_eq!(detail.item.line_total, Price::from_minor(10_000));
        assert_eq!(detail.order.subtotal, Price::from_minor(10_000));
        assert_eq!(detail.order.grand_total, Price::from_minor(10_000));

        let detail = ctx
            .orders
            .update_item(
                user,
                detail.item.uuid,
                UpdateOrderItem {
                    book_uuid: None,
                    qty: 3,
                },
            )
            .await?;

        assert_eq!(detail.item.line_total, Price::from_minor(15_000));
        assert_eq!(detail.order.subtotal, Price::from_minor(15_000));

        ctx.orders.remove_item(user, detail.item.uuid).await?;

        assert_eq!(ctx.order_totals(order).await, (0, 0));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn line_snapshots_survive_catalog_price_changes() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice").await;
        let address = ctx.create_address(user).await;
        let book = ctx.create_book("dune", 5000).await;

        let detail = ctx
            .orders
            .add_item(user, add_request(book.uuid, 2, address))
            .await?;

        ctx.books
            .update_price(book.uuid, Price::from_minor(9900))
            .await?;

        let detail = ctx.orders.get_item(user, detail.item.uuid).await?;

        assert_eq!(detail.item.price_snapshot, Price::from_minor(5000));
        assert_eq!(detail.item.line_total, Price::from_minor(10_000));
        assert_eq!(detail.book.price, Price::from_minor(9900));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn consecutive_adds_reuse_the_open_order() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice").await;
        let address = ctx.create_address(user).await;
        let dune = ctx.create_book("dune", 5000).await;
        let hyperion = ctx.create_book("hyperion", 2500).await;

        let first = ctx
            .orders
            .add_item(user, add_request(dune.uuid, 1, address))
            .await?;
        let second = ctx
            .orders
            .add_item(user, add_request(hyperion.uuid, 2, address))
            .await?;

        assert_eq!(first.order.uuid, second.order.uuid);
        assert_eq!(second.order.subtotal, Price::from_minor(10_000));

        Ok(())
    }
}
