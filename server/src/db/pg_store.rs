// booknest/server/src/db/pg_store.rs

use async_trait::async_trait;
use booknest::models::{Book, Cart, Order, OrderStatus, Role, User};
use booknest::store::{BookQuery, CartStore, CatalogStore, CheckoutStore, OrderLedger, Page, UserStore, WishlistUpdate};
use booknest::{BooknestError, Result};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::db::db_error;
use crate::db::rows::{collect, BookRow, CartRow, OrderRow, UserRow};

const BOOK_COLUMNS: &str =
  "id, title, author, genre, description, price, stock, seller_id, rating, image_url, created_at, updated_at";
const USER_COLUMNS: &str = "id, name, email, password_hash, role, wishlist, created_at, updated_at";
const ORDER_COLUMNS: &str =
  "id, user_id, lines, shipping_address, total_amount, status, request_id, created_at, updated_at";

// Matches books whose title or author contains $1 (an ILIKE pattern or NULL)
// and whose genre equals $2 (or NULL).
const BOOK_FILTER: &str = "($1::text IS NULL OR title ILIKE $1 OR author ILIKE $1) AND ($2::text IS NULL OR genre = $2)";

fn persistence(err: sqlx::Error) -> BooknestError {
  db_error(err, "Record already exists.")
}

fn like_pattern(needle: &str) -> String {
  let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
  format!("%{}%", escaped)
}

async fn write_order<'e, E: PgExecutor<'e>>(executor: E, order: &Order) -> Result<()> {
  sqlx::query(&format!(
    "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    ORDER_COLUMNS
  ))
  .bind(order.id)
  .bind(order.user_id)
  .bind(Json(&order.lines))
  .bind(Json(&order.shipping_address))
  .bind(order.total_amount)
  .bind(order.status.as_str())
  .bind(&order.request_id)
  .bind(order.created_at)
  .bind(order.updated_at)
  .execute(executor)
  .await
  .map_err(|e| db_error(e, "An order with this request id already exists."))?;
  Ok(())
}

async fn write_cart<'e, E: PgExecutor<'e>>(executor: E, cart: &Cart) -> Result<()> {
  sqlx::query(
    "INSERT INTO carts (user_id, lines, updated_at) VALUES ($1, $2, $3) \
     ON CONFLICT (user_id) DO UPDATE SET lines = EXCLUDED.lines, updated_at = EXCLUDED.updated_at",
  )
  .bind(cart.user_id)
  .bind(Json(&cart.lines))
  .bind(cart.updated_at)
  .execute(executor)
  .await
  .map_err(persistence)?;
  Ok(())
}

/// Every store over one Postgres pool.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  // An edit that matched no row either found nothing to change or no user.
  async fn wishlist_outcome(&self, user_id: Uuid, edited: Option<Vec<Uuid>>) -> Result<Option<WishlistUpdate>> {
    if let Some(wishlist) = edited {
      return Ok(Some(WishlistUpdate { wishlist, changed: true }));
    }
    let current: Option<Vec<Uuid>> = sqlx::query_scalar("SELECT wishlist FROM users WHERE id = $1")
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(current.map(|wishlist| WishlistUpdate { wishlist, changed: false }))
  }

  pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(&self.pool).await
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn get_book(&self, id: Uuid) -> Result<Option<Book>> {
    let row: Option<BookRow> = sqlx::query_as(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(persistence)?;
    row.map(Book::try_from).transpose()
  }

  async fn insert_book(&self, book: &Book) -> Result<()> {
    sqlx::query(&format!(
      "INSERT INTO books ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
      BOOK_COLUMNS
    ))
    .bind(book.id)
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.genre.as_str())
    .bind(&book.description)
    .bind(book.price)
    .bind(i64::from(book.stock))
    .bind(book.seller_id)
    .bind(book.rating)
    .bind(&book.image_url)
    .bind(book.created_at)
    .bind(book.updated_at)
    .execute(&self.pool)
    .await
    .map_err(persistence)?;
    Ok(())
  }

  // Stock is written only when $10 (the stock that was read) is given and
  // still matches.
  async fn update_book(&self, book: &Book, expected_stock: Option<u32>) -> Result<Option<Book>> {
    let row: Option<BookRow> = sqlx::query_as(&format!(
      "UPDATE books SET title = $2, author = $3, genre = $4, description = $5, price = $6, rating = $7, \
       image_url = $8, updated_at = $9, stock = CASE WHEN $10::bigint IS NULL THEN stock ELSE $11 END \
       WHERE id = $1 AND ($10::bigint IS NULL OR stock = $10) RETURNING {}",
      BOOK_COLUMNS
    ))
    .bind(book.id)
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.genre.as_str())
    .bind(&book.description)
    .bind(book.price)
    .bind(book.rating)
    .bind(&book.image_url)
    .bind(book.updated_at)
    .bind(expected_stock.map(i64::from))
    .bind(i64::from(book.stock))
    .fetch_optional(&self.pool)
    .await
    .map_err(persistence)?;

    let Some(row) = row else {
      if expected_stock.is_some() && self.get_book(book.id).await?.is_some() {
        return Err(BooknestError::Conflict(format!(
          "Stock of book {} changed while it was being edited.",
          book.id
        )));
      }
      return Ok(None);
    };
    Book::try_from(row).map(Some)
  }

  async fn delete_book(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM books WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "PgStore::search_books", skip(self), err(Display))]
  async fn search_books(&self, query: &BookQuery) -> Result<Page<Book>> {
    let pattern = query.search.as_deref().map(like_pattern);
    let genre = query.genre.map(|g| g.as_str());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM books WHERE {}", BOOK_FILTER))
      .bind(&pattern)
      .bind(genre)
      .fetch_one(&self.pool)
      .await
      .map_err(persistence)?;

    let rows: Vec<BookRow> = sqlx::query_as(&format!(
      "SELECT {} FROM books WHERE {} ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
      BOOK_COLUMNS, BOOK_FILTER
    ))
    .bind(&pattern)
    .bind(genre)
    .bind(i64::from(query.limit))
    .bind(query.offset() as i64)
    .fetch_all(&self.pool)
    .await
    .map_err(persistence)?;

    Ok(Page::new(collect(rows)?, query, total.max(0) as u64))
  }

  async fn books_by_seller(&self, seller_id: Uuid) -> Result<Vec<Book>> {
    let rows: Vec<BookRow> = sqlx::query_as(&format!(
      "SELECT {} FROM books WHERE seller_id = $1 ORDER BY created_at DESC, id DESC",
      BOOK_COLUMNS
    ))
    .bind(seller_id)
    .fetch_all(&self.pool)
    .await
    .map_err(persistence)?;
    collect(rows)
  }

  async fn decrement_stock(&self, id: Uuid, quantity: u32) -> Result<bool> {
    let result = sqlx::query("UPDATE books SET stock = stock - $2, updated_at = now() WHERE id = $1 AND stock >= $2")
      .bind(id)
      .bind(i64::from(quantity))
      .execute(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(result.rows_affected() == 1)
  }

  async fn restore_stock(&self, id: Uuid, quantity: u32) -> Result<()> {
    sqlx::query("UPDATE books SET stock = LEAST(stock + $2, 4294967295), updated_at = now() WHERE id = $1")
      .bind(id)
      .bind(i64::from(quantity))
      .execute(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(())
  }

  async fn count_books(&self) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
      .fetch_one(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(count.max(0) as u64)
  }
}

#[async_trait]
impl UserStore for PgStore {
  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(persistence)?;
    row.map(User::try_from).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await
      .map_err(persistence)?;
    row.map(User::try_from).transpose()
  }

  async fn insert_user(&self, user: &User) -> Result<()> {
    sqlx::query(&format!(
      "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
      USER_COLUMNS
    ))
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(&user.wishlist)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|e| db_error(e, "User already exists with this email."))?;
    Ok(())
  }

  async fn update_user(&self, user: &User) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET name = $2, email = $3, password_hash = $4, updated_at = $5 WHERE id = $1")
      .bind(user.id)
      .bind(&user.name)
      .bind(&user.email)
      .bind(&user.password_hash)
      .bind(user.updated_at)
      .execute(&self.pool)
      .await
      .map_err(|e| db_error(e, "Email is already in use."))?;
    Ok(result.rows_affected() == 1)
  }

  async fn add_to_wishlist(&self, user_id: Uuid, book_id: Uuid) -> Result<Option<WishlistUpdate>> {
    let appended: Option<Vec<Uuid>> = sqlx::query_scalar(
      "UPDATE users SET wishlist = array_append(wishlist, $2), updated_at = now() \
       WHERE id = $1 AND NOT ($2 = ANY(wishlist)) RETURNING wishlist",
    )
    .bind(user_id)
    .bind(book_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(persistence)?;
    self.wishlist_outcome(user_id, appended).await
  }

  async fn remove_from_wishlist(&self, user_id: Uuid, book_id: Uuid) -> Result<Option<WishlistUpdate>> {
    let removed: Option<Vec<Uuid>> = sqlx::query_scalar(
      "UPDATE users SET wishlist = array_remove(wishlist, $2), updated_at = now() \
       WHERE id = $1 AND $2 = ANY(wishlist) RETURNING wishlist",
    )
    .bind(user_id)
    .bind(book_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(persistence)?;
    self.wishlist_outcome(user_id, removed).await
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(result.rows_affected() == 1)
  }

  async fn users_by_role(&self, role: Role) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(&format!(
      "SELECT {} FROM users WHERE role = $1 ORDER BY created_at DESC",
      USER_COLUMNS
    ))
    .bind(role.as_str())
    .fetch_all(&self.pool)
    .await
    .map_err(persistence)?;
    collect(rows)
  }

  async fn count_users_by_role(&self, role: Role) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
      .bind(role.as_str())
      .fetch_one(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(count.max(0) as u64)
  }
}

#[async_trait]
impl CartStore for PgStore {
  async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
    let row: Option<CartRow> = sqlx::query_as("SELECT user_id, lines, updated_at FROM carts WHERE user_id = $1")
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(row.map(Cart::from))
  }

  async fn save_cart(&self, cart: &Cart) -> Result<()> {
    write_cart(&self.pool, cart).await
  }

  async fn delete_cart(&self, user_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM carts WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(())
  }
}

#[async_trait]
impl OrderLedger for PgStore {
  async fn insert_order(&self, order: &Order) -> Result<()> {
    write_order(&self.pool, order).await
  }

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(persistence)?;
    row.map(Order::try_from).transpose()
  }

  async fn delete_order(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(result.rows_affected() == 1)
  }

  async fn find_order_by_request(&self, user_id: Uuid, request_id: &str) -> Result<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 AND request_id = $2",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .bind(request_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(persistence)?;
    row.map(Order::try_from).transpose()
  }

  async fn update_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus, at: DateTime<Utc>) -> Result<bool> {
    let result = sqlx::query("UPDATE orders SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2")
      .bind(id)
      .bind(from.as_str())
      .bind(to.as_str())
      .bind(at)
      .execute(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(result.rows_affected() == 1)
  }

  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await
    .map_err(persistence)?;
    collect(rows)
  }

  async fn all_orders(&self) -> Result<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await
    .map_err(persistence)?;
    collect(rows)
  }

  async fn orders_containing_books(&self, book_ids: &[Uuid]) -> Result<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE EXISTS ( \
         SELECT 1 FROM jsonb_array_elements(lines) AS line WHERE (line->>'book_id')::uuid = ANY($1) \
       ) ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(book_ids)
    .fetch_all(&self.pool)
    .await
    .map_err(persistence)?;
    collect(rows)
  }

  async fn count_orders(&self) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
      .fetch_one(&self.pool)
      .await
      .map_err(persistence)?;
    Ok(count.max(0) as u64)
  }
}

#[async_trait]
impl CheckoutStore for PgStore {
  // One transaction: a failed decrement or a duplicate request id rolls back
  // every earlier write.
  #[instrument(name = "PgStore::commit_order", skip(self, order), fields(order_id = %order.id), err(Display))]
  async fn commit_order(&self, order: &Order) -> Result<()> {
    let mut tx = self.pool.begin().await.map_err(persistence)?;

    for line in &order.lines {
      let result = sqlx::query("UPDATE books SET stock = stock - $2, updated_at = $3 WHERE id = $1 AND stock >= $2")
        .bind(line.book_id)
        .bind(i64::from(line.quantity))
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(persistence)?;
      if result.rows_affected() != 1 {
        tx.rollback().await.map_err(persistence)?;
        let available = self.get_book(line.book_id).await?.map_or(0, |b| b.stock);
        return Err(BooknestError::InsufficientStock {
          book_id: line.book_id,
          title: line.title.clone(),
          requested: line.quantity,
          available,
        });
      }
    }

    write_order(&mut *tx, order).await?;
    write_cart(&mut *tx, &Cart::empty(order.user_id)).await?;
    tx.commit().await.map_err(persistence)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("dune"), "%dune%");
    assert_eq!(like_pattern("100%_off\\"), "%100\\%\\_off\\\\%");
  }
}
