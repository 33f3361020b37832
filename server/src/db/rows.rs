// booknest/server/src/db/rows.rs

//! Row shapes as stored, and their conversion into domain records.

use anyhow::anyhow;
use booknest::models::{Book, Cart, CartLine, LineItem, Order, ShippingAddress, User};
use booknest::BooknestError;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

fn corrupt(what: &str, detail: impl std::fmt::Display) -> BooknestError {
  BooknestError::persistence(anyhow!("Corrupt {} row: {}", what, detail))
}

#[derive(Debug, FromRow)]
pub(crate) struct BookRow {
  pub id: Uuid,
  pub title: String,
  pub author: String,
  pub genre: String,
  pub description: String,
  pub price: i64,
  pub stock: i64,
  pub seller_id: Uuid,
  pub rating: f64,
  pub image_url: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
  type Error = BooknestError;

  fn try_from(row: BookRow) -> Result<Self, Self::Error> {
    Ok(Book {
      id: row.id,
      title: row.title,
      author: row.author,
      genre: row.genre.parse().map_err(|e| corrupt("book", e))?,
      description: row.description,
      price: row.price,
      stock: u32::try_from(row.stock).map_err(|e| corrupt("book", e))?,
      seller_id: row.seller_id,
      rating: row.rating,
      image_url: row.image_url,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub password_hash: String,
  pub role: String,
  pub wishlist: Vec<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
  type Error = BooknestError;

  fn try_from(row: UserRow) -> Result<Self, Self::Error> {
    Ok(User {
      id: row.id,
      name: row.name,
      email: row.email,
      password_hash: row.password_hash,
      role: row.role.parse().map_err(|e| corrupt("user", e))?,
      wishlist: row.wishlist,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
pub(crate) struct CartRow {
  pub user_id: Uuid,
  pub lines: Json<Vec<CartLine>>,
  pub updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
  fn from(row: CartRow) -> Self {
    Cart {
      user_id: row.user_id,
      lines: row.lines.0,
      updated_at: row.updated_at,
    }
  }
}

#[derive(Debug, FromRow)]
pub(crate) struct OrderRow {
  pub id: Uuid,
  pub user_id: Uuid,
  pub lines: Json<Vec<LineItem>>,
  pub shipping_address: Json<ShippingAddress>,
  pub total_amount: i64,
  pub status: String,
  pub request_id: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = BooknestError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    Ok(Order {
      id: row.id,
      user_id: row.user_id,
      lines: row.lines.0,
      shipping_address: row.shipping_address.0,
      total_amount: row.total_amount,
      status: row.status.parse().map_err(|e| corrupt("order", e))?,
      request_id: row.request_id,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

pub(crate) fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, BooknestError>
where
  T: TryFrom<R, Error = BooknestError>,
{
  rows.into_iter().map(T::try_from).collect()
}
