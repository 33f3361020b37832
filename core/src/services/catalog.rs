// booknest/core/src/services/catalog.rs

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{authorize, Caller, Capability};
use crate::error::{BooknestError, Result};
use crate::models::{Book, BookCreate, BookUpdate};
use crate::store::{BookQuery, Page, Stores};

#[derive(Clone)]
pub struct CatalogService {
  stores: Stores,
}

impl CatalogService {
  pub fn new(stores: Stores) -> Self {
    Self { stores }
  }

  #[instrument(name = "catalog::list", skip(self), err(Display))]
  pub async fn list(&self, query: &BookQuery) -> Result<Page<Book>> {
    self.stores.catalog.search_books(query).await
  }

  #[instrument(name = "catalog::get", skip(self), err(Display))]
  pub async fn get(&self, id: Uuid) -> Result<Book> {
    self
      .stores
      .catalog
      .get_book(id)
      .await?
      .ok_or_else(|| BooknestError::not_found("Book", id))
  }

  #[instrument(name = "catalog::create", skip(self, params), fields(seller_id = %caller.user_id), err(Display))]
  pub async fn create(&self, caller: &Caller, params: BookCreate) -> Result<Book> {
    authorize(caller, Capability::ManageOwnBooks)?;
    let book = Book::from_create(Uuid::new_v4(), caller.user_id, params, Utc::now())?;
    self.stores.catalog.insert_book(&book).await?;
    info!(book_id = %book.id, title = %book.title, "Book created.");
    Ok(book)
  }

  // Loads a book the caller is allowed to modify.
  async fn owned_book(&self, caller: &Caller, id: Uuid, action: &str) -> Result<Book> {
    authorize(caller, Capability::ManageOwnBooks)?;
    let book = self.get(id).await?;
    if book.seller_id != caller.user_id {
      warn!(book_id = %id, seller_id = %caller.user_id, "Seller does not own book.");
      return Err(BooknestError::Unauthorized(format!("Not authorized to {} this book.", action)));
    }
    Ok(book)
  }

  #[instrument(name = "catalog::update", skip(self, update), fields(seller_id = %caller.user_id), err(Display))]
  pub async fn update(&self, caller: &Caller, id: Uuid, update: BookUpdate) -> Result<Book> {
    let mut book = self.owned_book(caller, id, "update").await?;
    // Stock is only written back when this update sets it, and only over
    // the value read here, so concurrent checkouts are never undone.
    let expected_stock = update.stock.is_some().then_some(book.stock);
    book.apply(update, Utc::now())?;
    let book = self
      .stores
      .catalog
      .update_book(&book, expected_stock)
      .await?
      .ok_or_else(|| BooknestError::not_found("Book", id))?;
    info!(book_id = %id, stock = book.stock, "Book updated.");
    Ok(book)
  }

  #[instrument(name = "catalog::delete", skip(self), fields(seller_id = %caller.user_id), err(Display))]
  pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<()> {
    self.owned_book(caller, id, "delete").await?;
    if !self.stores.catalog.delete_book(id).await? {
      return Err(BooknestError::not_found("Book", id));
    }
    info!(book_id = %id, "Book deleted.");
    Ok(())
  }

  #[instrument(name = "catalog::seller_books", skip(self), fields(seller_id = %caller.user_id), err(Display))]
  pub async fn seller_books(&self, caller: &Caller) -> Result<Vec<Book>> {
    authorize(caller, Capability::ManageOwnBooks)?;
    self.stores.catalog.books_by_seller(caller.user_id).await
  }
}
