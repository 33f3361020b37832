// booknest/server/tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use booknest::models::{Book, BookCreate, Genre, Role};
use booknest::services::LoginRequest;
use booknest::{Booknest, Caller, Stores};
use booknest_server::config::AppConfig;
use booknest_server::state::AppState;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;

pub const TEST_SECRET: &str = "server-test-secret-server-test-secret";

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

pub fn config() -> AppConfig {
  AppConfig::from_lookup(|name| match name {
    "TOKEN_SECRET" => Some(TEST_SECRET.to_string()),
    _ => None,
  })
  .expect("test configuration is valid")
}

/// App state over a fresh in-memory store.
pub fn state() -> AppState {
  setup_tracing();
  let config = config();
  let booknest = Booknest::new(Stores::in_memory(), &config.settings()).expect("test settings are valid");
  AppState {
    booknest,
    config: Arc::new(config),
  }
}

/// Creates an account with any role and returns a bearer header value for it.
pub async fn sign_in(state: &AppState, name: &str, email: &str, role: Role) -> (Caller, String) {
  let password = "correct-horse";
  let user = state
    .booknest
    .accounts
    .create_account(name, email, password, role)
    .await
    .expect("account is created");
  let session = state
    .booknest
    .accounts
    .login(LoginRequest {
      email: email.to_string(),
      password: password.to_string(),
    })
    .await
    .expect("login succeeds");
  (Caller::new(user.id, user.role), format!("Bearer {}", session.token))
}

pub async fn add_book(state: &AppState, seller: &Caller, title: &str, price: i64, stock: i64) -> Book {
  let params = BookCreate {
    title: title.to_string(),
    author: "Test Author".to_string(),
    genre: Genre::Fiction,
    description: "A book used in tests.".to_string(),
    price,
    stock,
    rating: None,
    image_url: None,
  };
  state.booknest.catalog.create(seller, params).await.expect("book is created")
}

pub fn order_body(book_id: uuid::Uuid, quantity: i64) -> serde_json::Value {
  serde_json::json!({
    "lines": [{ "book_id": book_id, "quantity": quantity }],
    "shipping_address": {
      "address": "1 Library Lane",
      "city": "Springfield",
      "postalCode": "12345",
      "country": "US"
    }
  })
}
