// booknest/core/tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use async_trait::async_trait;
use booknest::models::{Book, BookCreate, Genre, OrderLineRequest, PlaceOrderRequest, Role, ShippingAddress};
use booknest::store::{BookQuery, CatalogStore, MemoryStore, Page};
use booknest::{Booknest, Caller, Settings, Stores};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Barrier, Notify};
use tracing::Level;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-test-secret-test-secret!";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn settings() -> Settings {
  Settings::new(TEST_SECRET)
}

pub fn app() -> Booknest {
  app_with(Stores::in_memory(), settings())
}

pub fn app_with(stores: Stores, settings: Settings) -> Booknest {
  setup_tracing();
  Booknest::new(stores, &settings).expect("test settings are valid")
}

pub fn shopper() -> Caller {
  Caller::new(Uuid::new_v4(), Role::Shopper)
}

pub fn seller() -> Caller {
  Caller::new(Uuid::new_v4(), Role::Seller)
}

pub fn admin() -> Caller {
  Caller::new(Uuid::new_v4(), Role::Admin)
}

pub fn book_params(title: &str, price: i64, stock: i64) -> BookCreate {
  BookCreate {
    title: title.to_string(),
    author: "Test Author".to_string(),
    genre: Genre::Fiction,
    description: format!("About {}.", title),
    price,
    stock,
    rating: None,
    image_url: None,
  }
}

pub async fn add_book(app: &Booknest, seller: &Caller, title: &str, price: i64, stock: i64) -> Book {
  app
    .catalog
    .create(seller, book_params(title, price, stock))
    .await
    .expect("book is created")
}

pub async fn stock_of(app: &Booknest, book_id: Uuid) -> u32 {
  app.catalog.get(book_id).await.expect("book exists").stock
}

pub fn address() -> ShippingAddress {
  ShippingAddress {
    address: "12 Paper Lane".to_string(),
    city: "Leafton".to_string(),
    postal_code: "10101".to_string(),
    country: "Bookland".to_string(),
  }
}

pub fn order_for(lines: &[(Uuid, i64)]) -> PlaceOrderRequest {
  PlaceOrderRequest {
    lines: lines
      .iter()
      .map(|(book_id, quantity)| OrderLineRequest {
        book_id: *book_id,
        quantity: *quantity,
      })
      .collect(),
    shipping_address: address(),
    request_id: None,
  }
}

/// Memory-backed stores with no atomic placement commit, so checkout takes
/// the per-record path.
pub fn per_record_stores(memory: Arc<MemoryStore>) -> Stores {
  Stores::from_parts(memory.clone(), memory.clone(), memory.clone(), memory)
}

/// Catalog over a [`MemoryStore`] that parks the first `held` `get_book`
/// calls, after they have read, at a barrier of `parties`.
pub struct GatedCatalog {
  inner: Arc<MemoryStore>,
  held: AtomicUsize,
  gate: Barrier,
  arrived: Notify,
}

impl GatedCatalog {
  pub fn new(inner: Arc<MemoryStore>, held: usize, parties: usize) -> Self {
    Self {
      inner,
      held: AtomicUsize::new(held),
      gate: Barrier::new(parties),
      arrived: Notify::new(),
    }
  }

  /// Holds the next `n` reads.
  pub fn hold_next(&self, n: usize) {
    self.held.store(n, Ordering::SeqCst);
  }

  /// Resolves once a held read has reached the gate.
  pub async fn arrived(&self) {
    self.arrived.notified().await;
  }

  /// Joins the barrier from the test side.
  pub async fn open(&self) {
    self.gate.wait().await;
  }
}

#[async_trait]
impl CatalogStore for GatedCatalog {
  async fn get_book(&self, id: Uuid) -> booknest::Result<Option<Book>> {
    let book = self.inner.get_book(id).await?;
    if self.held.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok() {
      self.arrived.notify_one();
      self.gate.wait().await;
    }
    Ok(book)
  }
  async fn insert_book(&self, book: &Book) -> booknest::Result<()> {
    self.inner.insert_book(book).await
  }
  async fn update_book(&self, book: &Book, expected_stock: Option<u32>) -> booknest::Result<Option<Book>> {
    self.inner.update_book(book, expected_stock).await
  }
  async fn delete_book(&self, id: Uuid) -> booknest::Result<bool> {
    self.inner.delete_book(id).await
  }
  async fn search_books(&self, query: &BookQuery) -> booknest::Result<Page<Book>> {
    self.inner.search_books(query).await
  }
  async fn books_by_seller(&self, seller_id: Uuid) -> booknest::Result<Vec<Book>> {
    self.inner.books_by_seller(seller_id).await
  }
  async fn decrement_stock(&self, id: Uuid, quantity: u32) -> booknest::Result<bool> {
    self.inner.decrement_stock(id, quantity).await
  }
  async fn restore_stock(&self, id: Uuid, quantity: u32) -> booknest::Result<()> {
    self.inner.restore_stock(id, quantity).await
  }
  async fn count_books(&self) -> booknest::Result<u64> {
    self.inner.count_books().await
  }
}
