//! Carts service.
//!
//! Carts are lighter than orders: one active cart per user created on
//! first add, a quantity-scaled price snapshot per item, hard deletes,
//! and no aggregate totals.

use async_trait::async_trait;
use folio::{
    pagination::{PageOf, PageRequest},
    prices::Price,
};
use mockall::automock;
use sqlx::{Postgres, Transaction};

use crate::{
    database::Db,
    domain::{
        books::{PgBooksRepository, models::Book},
        carts::{
            PgCartItemsRepository, PgCartsRepository,
            data::{NewCartItem, UpdateCartItem},
            errors::CartsServiceError,
            models::{CartItem, CartItemDetail, CartItemUuid, CartUuid},
        },
        users::models::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    books_repository: PgBooksRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            books_repository: PgBooksRepository::new(),
        }
    }

    async fn get_detail(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        user: UserUuid,
    ) -> Result<CartItemDetail, CartsServiceError> {
        self.items_repository
            .get_item_detail(tx, item, user)
            .await?
            .ok_or(CartsServiceError::NotFound)
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemDetail, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let book = self
            .books_repository
            .find_book_by_uuid(&mut tx, item.book_uuid)
            .await?
            .ok_or(CartsServiceError::BookNotFound)?;

        let cart = self
            .carts_repository
            .upsert_cart(&mut tx, CartUuid::generate(), user)
            .await?;

        if self
            .items_repository
            .find_item_by_book(&mut tx, cart.uuid, book.uuid)
            .await?
            .is_some()
        {
            return Err(CartsServiceError::AlreadyExists);
        }

        let qty = clamped_qty(item.qty);
        let snapshot = scaled_snapshot(book.price, qty)?;

        let created = self
            .items_repository
            .create_item(
                &mut tx,
                item.uuid,
                cart.uuid,
                book.uuid,
                qty,
                i64::try_from(snapshot.minor())?,
                item.note.as_deref(),
            )
            .await?;

        let detail = self.get_detail(&mut tx, created.uuid, user).await?;

        tx.commit().await?;

        Ok(detail)
    }

    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        update: UpdateCartItem,
    ) -> Result<CartItemDetail, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self
            .items_repository
            .find_item_for_user(&mut tx, item, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let replacement = match update.book_uuid {
            Some(book) if book != current.book_uuid => Some(
                self.books_repository
                    .find_book_by_uuid(&mut tx, book)
                    .await?
                    .ok_or(CartsServiceError::BookNotFound)?,
            ),
            _ => None,
        };

        let qty = clamped_qty(update.qty);
        let snapshot = refreshed_snapshot(&current, replacement.as_ref(), qty)?;
        let book_uuid = replacement.as_ref().map_or(current.book_uuid, |b| b.uuid);

        let updated = self
            .items_repository
            .update_item(
                &mut tx,
                item,
                user,
                book_uuid,
                qty,
                i64::try_from(snapshot.minor())?,
                update.note.as_deref(),
            )
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let detail = self.get_detail(&mut tx, updated.uuid, user).await?;

        tx.commit().await?;

        Ok(detail)
    }

    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.items_repository.delete_item(&mut tx, item, user).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn get_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartItemDetail, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let detail = self.get_detail(&mut tx, item, user).await?;

        tx.commit().await?;

        Ok(detail)
    }

    async fn search_items(
        &self,
        user: UserUuid,
        page: PageRequest,
    ) -> Result<PageOf<CartItemDetail>, CartsServiceError> {
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
pub trait CartsService: Send + Sync {
    /// Adds a book to the caller's cart, creating the cart on first
    /// use. A book already in the cart is a conflict, never a merge.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemDetail, CartsServiceError>;

    /// Updates quantity, book, or note of an owned cart item.
    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        update: UpdateCartItem,
    ) -> Result<CartItemDetail, CartsServiceError>;

    /// Removes an owned cart item outright.
    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError>;

    /// Retrieves an owned cart item with its book summary.
    async fn get_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartItemDetail, CartsServiceError>;

    /// Pages through the caller's cart items, newest first.
    async fn search_items(
        &self,
        user: UserUuid,
        page: PageRequest,
    ) -> Result<PageOf<CartItemDetail>, CartsServiceError>;
}

/// A requested quantity below one silently becomes one.
const fn clamped_qty(qty: u32) -> u32 {
    if qty == 0 { 1 } else { qty }
}

/// Cart snapshots store the whole-line amount, `unit_price × qty`.
fn scaled_snapshot(unit_price: Price, qty: u32) -> Result<Price, CartsServiceError> {
    unit_price
        .checked_mul(qty)
        .ok_or(CartsServiceError::AmountOutOfRange)
}

/// Unit price recovered from a stored quantity-scaled snapshot. Stored
/// quantities are never zero.
fn stored_unit_price(item: &CartItem) -> Price {
    let qty = u64::from(item.qty.max(1));

    Price::from_minor(item.price_snapshot.minor() / qty)
}

/// A replacement book re-freezes the price; otherwise the stored unit
/// price is kept and rescaled for the new quantity.
fn refreshed_snapshot(
    current: &CartItem,
    replacement: Option<&Book>,
    qty: u32,
) -> Result<Price, CartsServiceError> {
    let unit_price = match replacement {
        Some(book) => book.price,
        None => stored_unit_price(current),
    };

    scaled_snapshot(unit_price, qty)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{domain::books::models::BookUuid, test::TestContext, uuids::TypedUuid};

    use super::*;

    fn item_with_snapshot(snapshot_minor: u64, qty: u32) -> CartItem {
        let now = Timestamp::UNIX_EPOCH;

        CartItem {
            uuid: TypedUuid::generate(),
            cart_uuid: TypedUuid::generate(),
            book_uuid: TypedUuid::generate(),
            qty,
            price_snapshot: Price::from_minor(snapshot_minor),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn book(price_minor: u64) -> Book {
        let now = Timestamp::UNIX_EPOCH;

        Book {
            uuid: BookUuid::generate(),
            slug: "a-book".to_string(),
            title: "A Book".to_string(),
            price: Price::from_minor(price_minor),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn zero_quantity_is_clamped_to_one() {
        assert_eq!(clamped_qty(0), 1);
        assert_eq!(clamped_qty(1), 1);
        assert_eq!(clamped_qty(7), 7);
    }

    #[test]
    fn snapshot_scales_with_quantity() -> TestResult {
        let snapshot = scaled_snapshot(Price::from_minor(2500), 3)?;

        assert_eq!(snapshot, Price::from_minor(7500));

        Ok(())
    }

    #[test]
    fn quantity_change_keeps_the_stored_unit_price() -> TestResult {
        // 3 × 25.00 stored; dropping to 2 must use 25.00, not today's price.
        let current = item_with_snapshot(7500, 3);

        let snapshot = refreshed_snapshot(&current, None, 2)?;

        assert_eq!(snapshot, Price::from_minor(5000));

        Ok(())
    }

    #[test]
    fn book_change_refreezes_the_price() -> TestResult {
        let current = item_with_snapshot(7500, 3);
        let replacement = book(1000);

        let snapshot = refreshed_snapshot(&current, Some(&replacement), 3)?;

        assert_eq!(snapshot, Price::from_minor(3000));

        Ok(())
    }

    fn add_request(book: BookUuid, qty: u32, note: Option<&str>) -> NewCartItem {
        NewCartItem {
            uuid: TypedUuid::generate(),
            book_uuid: book,
            qty,
            note: note.map(str::to_string),
        }
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn adding_the_same_book_twice_is_a_conflict() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice").await;
        let book = ctx.create_book("dune", 5000).await;

        ctx.carts
            .add_item(user, add_request(book.uuid, 1, None))
            .await?;

        let result = ctx
            .carts
            .add_item(user, add_request(book.uuid, 2, None))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn cart_items_of_other_users_are_invisible() -> TestResult {
        let ctx = TestContext::new().await;
        let alice = ctx.create_user("alice").await;
        let bob = ctx.create_user("bob").await;
        let book = ctx.create_book("dune", 5000).await;

        let detail = ctx
            .carts
            .add_item(alice, add_request(book.uuid, 1, None))
            .await?;
        let item = detail.item.uuid;

        let get = ctx.carts.get_item(bob, item).await;
        assert!(
            matches!(get, Err(CartsServiceError::NotFound)),
            "expected NotFound on cross-user read, got {get:?}"
        );

        let remove = ctx.carts.remove_item(bob, item).await;
        assert!(
            matches!(remove, Err(CartsServiceError::NotFound)),
            "expected NotFound on cross-user removal, got {remove:?}"
        );

        // The owner still sees the untouched item.
        let detail = ctx.carts.get_item(alice, item).await?;
        assert_eq!(detail.item.qty, 1);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn updating_without_a_note_clears_the_stored_note() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice").await;
        let book = ctx.create_book("dune", 5000).await;

        let detail = ctx
            .carts
            .add_item(user, add_request(book.uuid, 1, Some("gift wrap")))
            .await?;
        assert_eq!(detail.item.note.as_deref(), Some("gift wrap"));

        let detail = ctx
            .carts
            .update_item(
                user,
                detail.item.uuid,
                UpdateCartItem {
                    book_uuid: None,
                    qty: 1,
                    note: None,
                },
            )
            .await?;
        assert_eq!(detail.item.note, None);

        let detail = ctx
            .carts
            .update_item(
                user,
                detail.item.uuid,
                UpdateCartItem {
                    book_uuid: None,
                    qty: 1,
                    note: Some("ribbon".to_string()),
                },
            )
            .await?;
        assert_eq!(detail.item.note.as_deref(), Some("ribbon"));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn zero_quantity_add_is_clamped_and_snapshot_scaled() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice").await;
        let book = ctx.create_book("dune", 2500).await;

        let detail = ctx
            .carts
            .add_item(user, add_request(book.uuid, 0, None))
            .await?;

        assert_eq!(detail.item.qty, 1);
        assert_eq!(detail.item.price_snapshot, Price::from_minor(2500));

        let detail = ctx
            .carts
            .update_item(
                user,
                detail.item.uuid,
                UpdateCartItem {
                    book_uuid: None,
                    qty: 3,
                    note: None,
                },
            )
            .await?;

        assert_eq!(detail.item.price_snapshot, Price::from_minor(7500));

        Ok(())
    }
}
