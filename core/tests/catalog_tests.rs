// booknest/core/tests/catalog_tests.rs
mod common;
use booknest::models::{Book, BookUpdate, Genre};
use booknest::store::{BookQuery, CatalogStore, MemoryStore};
use booknest::Stores;
use common::*;
use std::sync::Arc;

#[tokio::test]
async fn search_matches_title_or_author_case_insensitively() {
  let app = app();
  let seller = seller();
  add_book(&app, &seller, "The Hobbit", 100, 1).await;
  add_book(&app, &seller, "Persuasion", 100, 1).await;
  let mut params = book_params("Unrelated", 100, 1);
  params.author = "Hobbs".to_string();
  app.catalog.create(&seller, params).await.unwrap();

  let query = BookQuery::new(Some("HOBB"), None, None, None).unwrap();
  let page = app.catalog.list(&query).await.unwrap();
  assert_eq!(page.total, 2);
  // Newest first.
  assert_eq!(page.items[0].title, "Unrelated");
  assert_eq!(page.items[1].title, "The Hobbit");
}

#[tokio::test]
async fn genre_filter_and_pagination() {
  let app = app();
  let seller = seller();
  for i in 0..5 {
    let mut params = book_params(&format!("Mystery {}", i), 100, 1);
    params.genre = Genre::Mystery;
    app.catalog.create(&seller, params).await.unwrap();
  }
  add_book(&app, &seller, "Plain fiction", 100, 1).await;

  let query = BookQuery::new(None, Some(Genre::Mystery), Some(2), Some(2)).unwrap();
  let page = app.catalog.list(&query).await.unwrap();
  assert_eq!(page.total, 5);
  assert_eq!(page.total_pages, 3);
  assert_eq!(page.page, 2);
  assert_eq!(page.items.len(), 2);
  assert!(page.items.iter().all(|b| b.genre == Genre::Mystery));

  let last = BookQuery::new(None, Some(Genre::Mystery), Some(3), Some(2)).unwrap();
  assert_eq!(app.catalog.list(&last).await.unwrap().items.len(), 1);
}

#[tokio::test]
async fn only_the_owning_seller_edits_a_book() {
  let app = app();
  let owner = seller();
  let book = add_book(&app, &owner, "Owned", 100, 1).await;

  let update = BookUpdate {
    price: Some(150),
    ..Default::default()
  };
  let err = app.catalog.update(&seller(), book.id, update.clone()).await.unwrap_err();
  assert_eq!(err.kind(), "unauthorized");
  let err = app.catalog.delete(&admin(), book.id).await.unwrap_err();
  assert_eq!(err.kind(), "unauthorized");

  let updated = app.catalog.update(&owner, book.id, update).await.unwrap();
  assert_eq!(updated.price, 150);
  assert_eq!(app.catalog.get(book.id).await.unwrap().price, 150);

  app.catalog.delete(&owner, book.id).await.unwrap();
  assert_eq!(app.catalog.get(book.id).await.unwrap_err().kind(), "not_found");
}

#[tokio::test]
async fn shoppers_cannot_create_books() {
  let app = app();
  let err = app.catalog.create(&shopper(), book_params("Nope", 100, 1)).await.unwrap_err();
  assert_eq!(err.kind(), "unauthorized");
}

#[tokio::test]
async fn seller_books_lists_only_own() {
  let app = app();
  let a = seller();
  let b = seller();
  add_book(&app, &a, "A1", 100, 1).await;
  add_book(&app, &a, "A2", 100, 1).await;
  add_book(&app, &b, "B1", 100, 1).await;

  let mine = app.catalog.seller_books(&a).await.unwrap();
  assert_eq!(mine.len(), 2);
  assert!(mine.iter().all(|book| book.seller_id == a.user_id));
}

// The seller's edit reads the book, then stalls while an order takes stock.
async fn edit_during_checkout(update: BookUpdate) -> (booknest::Result<Book>, u32) {
  let memory = Arc::new(MemoryStore::new());
  let catalog = Arc::new(GatedCatalog::new(memory.clone(), 0, 2));
  let mut stores = Stores::from_parts(catalog.clone(), memory.clone(), memory.clone(), memory.clone());
  stores.checkout = Some(memory.clone());
  let app = app_with(stores, settings());
  let owner = seller();
  let book = add_book(&app, &owner, "Contested", 300, 5).await;

  let book_id = book.id;

  catalog.hold_next(1);
  let edit = tokio::spawn({
    let app = app.clone();
    async move { app.catalog.update(&owner, book_id, update).await }
  });
  catalog.arrived().await;

  app.checkout.place_order(&shopper(), order_for(&[(book_id, 3)])).await.unwrap();
  catalog.open().await;

  let result = edit.await.unwrap();
  let stock = memory.get_book(book_id).await.unwrap().unwrap().stock;
  (result, stock)
}

#[tokio::test]
async fn edit_without_stock_keeps_concurrent_checkout_decrement() {
  let update = BookUpdate {
    title: Some("Contested, revised".to_string()),
    ..Default::default()
  };
  let (result, stock) = edit_during_checkout(update).await;

  let updated = result.unwrap();
  assert_eq!(updated.title, "Contested, revised");
  assert_eq!(updated.stock, 2);
  assert_eq!(stock, 2);
}

#[tokio::test]
async fn stock_edit_over_stale_value_is_a_conflict() {
  let update = BookUpdate {
    stock: Some(10),
    ..Default::default()
  };
  let (result, stock) = edit_during_checkout(update).await;

  assert_eq!(result.unwrap_err().kind(), "conflict");
  assert_eq!(stock, 2);
}

#[tokio::test]
async fn stock_edit_applies_when_nothing_raced() {
  let app = app();
  let owner = seller();
  let book = add_book(&app, &owner, "Restocked", 300, 5).await;

  let update = BookUpdate {
    stock: Some(12),
    ..Default::default()
  };
  assert_eq!(app.catalog.update(&owner, book.id, update).await.unwrap().stock, 12);
  assert_eq!(stock_of(&app, book.id).await, 12);
}
