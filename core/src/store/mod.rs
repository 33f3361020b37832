// booknest/core/src/store/mod.rs

//! Persistence boundary.
//!
//! Each store is a narrow async trait over one kind of record. Operations
//! that must be atomic with respect to concurrent callers (stock decrement,
//! stock edits, order status change, wishlist edits, unique email and
//! request id) are expressed as single conditional operations.
//!
//! A backend that can write several records atomically also implements
//! [`CheckoutStore`], and order placement then commits stock, order and
//! cart together. Without it, placement falls back to one call per record
//! with compensation.

pub mod memory;
pub mod query;

pub use memory::MemoryStore;
pub use query::{BookQuery, Page, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Book, Cart, Order, OrderStatus, Role, User};

#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn get_book(&self, id: Uuid) -> Result<Option<Book>>;

  async fn insert_book(&self, book: &Book) -> Result<()>;

  /// Writes every field of `book` except `stock`, and returns the stored
  /// record, or `None` if it does not exist.
  ///
  /// Stock is only written when `expected_stock` is given, and only if the
  /// stored stock still equals it; otherwise the update fails with
  /// `Conflict` and nothing is written.
  async fn update_book(&self, book: &Book, expected_stock: Option<u32>) -> Result<Option<Book>>;

  async fn delete_book(&self, id: Uuid) -> Result<bool>;

  /// Filtered, paginated scan, newest first.
  async fn search_books(&self, query: &BookQuery) -> Result<Page<Book>>;

  async fn books_by_seller(&self, seller_id: Uuid) -> Result<Vec<Book>>;

  /// Decrements stock only if at least `quantity` units remain. Returns
  /// `false` when the book is missing or the condition does not hold.
  async fn decrement_stock(&self, id: Uuid, quantity: u32) -> Result<bool>;

  /// Adds `quantity` units back. A missing book is not an error.
  async fn restore_stock(&self, id: Uuid, quantity: u32) -> Result<()>;

  async fn count_books(&self) -> Result<u64>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
  async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

  /// `email` must already be normalized.
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

  /// Fails with `Conflict` when the email is taken.
  async fn insert_user(&self, user: &User) -> Result<()>;

  /// Writes name, email, password hash and `updated_at`. The wishlist is
  /// left alone. Fails with `Conflict` when the new email belongs to another
  /// account.
  async fn update_user(&self, user: &User) -> Result<bool>;

  /// Appends `book_id` unless already present. `None` if the user is missing.
  async fn add_to_wishlist(&self, user_id: Uuid, book_id: Uuid) -> Result<Option<WishlistUpdate>>;

  /// Removes `book_id` if present. `None` if the user is missing.
  async fn remove_from_wishlist(&self, user_id: Uuid, book_id: Uuid) -> Result<Option<WishlistUpdate>>;

  async fn delete_user(&self, id: Uuid) -> Result<bool>;

  async fn users_by_role(&self, role: Role) -> Result<Vec<User>>;

  async fn count_users_by_role(&self, role: Role) -> Result<u64>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>>;

  async fn save_cart(&self, cart: &Cart) -> Result<()>;

  async fn delete_cart(&self, user_id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait OrderLedger: Send + Sync {
  /// Appends an order. Fails with `Conflict` if the same user already has an
  /// order carrying the same `request_id`.
  async fn insert_order(&self, order: &Order) -> Result<()>;

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;

  /// Removes an order. Only used to undo a placement that failed after the
  /// order was written.
  async fn delete_order(&self, id: Uuid) -> Result<bool>;

  async fn find_order_by_request(&self, user_id: Uuid, request_id: &str) -> Result<Option<Order>>;

  /// Moves an order from `from` to `to`. Returns `false` if the order is
  /// missing or its status is no longer `from`.
  async fn update_order_status(
    &self,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
    at: DateTime<Utc>,
  ) -> Result<bool>;

  /// Newest first.
  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;

  /// Newest first.
  async fn all_orders(&self) -> Result<Vec<Order>>;

  /// Orders with at least one line referencing `book_ids`, newest first.
  async fn orders_containing_books(&self, book_ids: &[Uuid]) -> Result<Vec<Order>>;

  async fn count_orders(&self) -> Result<u64>;
}

/// Result of an atomic wishlist edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistUpdate {
  pub wishlist: Vec<Uuid>,
  /// False when the book was already present (add) or absent (remove).
  pub changed: bool,
}

#[async_trait]
pub trait CheckoutStore: Send + Sync {
  /// Writes a placement as one unit: a conditional decrement per line of
  /// `order`, the order itself, and an emptied cart for `order.user_id`.
  ///
  /// Either every write lands or none does. Fails with `InsufficientStock`
  /// when a line's stock no longer covers it, and with `Conflict` when the
  /// user already has an order with the same request id.
  async fn commit_order(&self, order: &Order) -> Result<()>;
}

/// Every store the services need, as shared trait objects.
#[derive(Clone)]
pub struct Stores {
  pub catalog: Arc<dyn CatalogStore>,
  pub users: Arc<dyn UserStore>,
  pub carts: Arc<dyn CartStore>,
  pub orders: Arc<dyn OrderLedger>,
  /// Present when the backend commits placements atomically.
  pub checkout: Option<Arc<dyn CheckoutStore>>,
}

impl Stores {
  /// Every store backed by one shared [`MemoryStore`].
  pub fn in_memory() -> Self {
    Self::from_backend(Arc::new(MemoryStore::new()))
  }

  /// Uses one backend for every store.
  pub fn from_backend<S>(backend: Arc<S>) -> Self
  where
    S: CatalogStore + UserStore + CartStore + OrderLedger + CheckoutStore + 'static,
  {
    Self {
      catalog: backend.clone(),
      users: backend.clone(),
      carts: backend.clone(),
      orders: backend.clone(),
      checkout: Some(backend),
    }
  }

  /// Separate stores with no atomic placement commit.
  pub fn from_parts(
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn UserStore>,
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderLedger>,
  ) -> Self {
    Self {
      catalog,
      users,
      carts,
      orders,
      checkout: None,
    }
  }
}
