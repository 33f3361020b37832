// booknest/core/src/store/memory.rs

//! Process-local store. Every write takes the single write lock, so each
//! trait operation is atomic with respect to the others.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{BooknestError, Result};
use crate::models::{Book, Cart, Order, OrderStatus, Role, User};
use crate::store::{BookQuery, CartStore, CatalogStore, CheckoutStore, OrderLedger, Page, UserStore, WishlistUpdate};

// Records remember their insertion sequence so "newest first" is stable when
// timestamps collide.
#[derive(Default)]
struct Tables {
  seq: u64,
  books: HashMap<Uuid, (u64, Book)>,
  users: HashMap<Uuid, User>,
  carts: HashMap<Uuid, Cart>,
  orders: HashMap<Uuid, (u64, Order)>,
}

impl Tables {
  fn next_seq(&mut self) -> u64 {
    self.seq += 1;
    self.seq
  }

  fn ensure_request_unique(&self, order: &Order) -> Result<()> {
    let Some(request_id) = &order.request_id else {
      return Ok(());
    };
    let duplicate = self
      .orders
      .values()
      .any(|(_, o)| o.user_id == order.user_id && o.request_id.as_ref() == Some(request_id));
    if duplicate {
      return Err(BooknestError::Conflict(format!(
        "An order with request id '{}' already exists.",
        request_id
      )));
    }
    Ok(())
  }

  fn edit_wishlist(&mut self, user_id: Uuid, edit: impl FnOnce(&mut Vec<Uuid>) -> bool) -> Option<WishlistUpdate> {
    let user = self.users.get_mut(&user_id)?;
    let changed = edit(&mut user.wishlist);
    if changed {
      user.updated_at = Utc::now();
    }
    Some(WishlistUpdate {
      wishlist: user.wishlist.clone(),
      changed,
    })
  }
}

fn newest_first<'a, T: 'a>(
  rows: impl Iterator<Item = &'a (u64, T)>,
  created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<&'a T> {
  let mut rows: Vec<&(u64, T)> = rows.collect();
  rows.sort_by(|(sa, a), (sb, b)| created_at(b).cmp(&created_at(a)).then(sb.cmp(sa)));
  rows.into_iter().map(|(_, t)| t).collect()
}

#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn get_book(&self, id: Uuid) -> Result<Option<Book>> {
    Ok(self.tables.read().books.get(&id).map(|(_, b)| b.clone()))
  }

  async fn insert_book(&self, book: &Book) -> Result<()> {
    let mut tables = self.tables.write();
    if tables.books.contains_key(&book.id) {
      return Err(BooknestError::Conflict(format!("Book {} already exists.", book.id)));
    }
    let seq = tables.next_seq();
    tables.books.insert(book.id, (seq, book.clone()));
    Ok(())
  }

  async fn update_book(&self, book: &Book, expected_stock: Option<u32>) -> Result<Option<Book>> {
    let mut tables = self.tables.write();
    let Some((_, stored)) = tables.books.get_mut(&book.id) else {
      return Ok(None);
    };
    let stock = match expected_stock {
      Some(expected) if stored.stock != expected => {
        return Err(BooknestError::Conflict(format!(
          "Stock of book {} changed while it was being edited.",
          book.id
        )));
      }
      Some(_) => book.stock,
      None => stored.stock,
    };
    *stored = Book { stock, ..book.clone() };
    Ok(Some(stored.clone()))
  }

  async fn delete_book(&self, id: Uuid) -> Result<bool> {
    Ok(self.tables.write().books.remove(&id).is_some())
  }

  async fn search_books(&self, query: &BookQuery) -> Result<Page<Book>> {
    let tables = self.tables.read();
    let matching: Vec<&Book> = newest_first(tables.books.values(), |b: &Book| b.created_at)
      .into_iter()
      .filter(|b| query.genre.map_or(true, |g| b.genre == g))
      .filter(|b| query.matches_text(&b.title, &b.author))
      .collect();
    let total = matching.len() as u64;
    let items = matching
      .into_iter()
      .skip(query.offset() as usize)
      .take(query.limit as usize)
      .cloned()
      .collect();
    Ok(Page::new(items, query, total))
  }

  async fn books_by_seller(&self, seller_id: Uuid) -> Result<Vec<Book>> {
    let tables = self.tables.read();
    Ok(
      newest_first(tables.books.values(), |b: &Book| b.created_at)
        .into_iter()
        .filter(|b| b.seller_id == seller_id)
        .cloned()
        .collect(),
    )
  }

  async fn decrement_stock(&self, id: Uuid, quantity: u32) -> Result<bool> {
    let mut tables = self.tables.write();
    match tables.books.get_mut(&id) {
      Some((_, book)) if book.stock >= quantity => {
        book.stock -= quantity;
        book.updated_at = Utc::now();
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn restore_stock(&self, id: Uuid, quantity: u32) -> Result<()> {
    if let Some((_, book)) = self.tables.write().books.get_mut(&id) {
      book.stock = book.stock.saturating_add(quantity);
      book.updated_at = Utc::now();
    }
    Ok(())
  }

  async fn count_books(&self) -> Result<u64> {
    Ok(self.tables.read().books.len() as u64)
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.tables.read().users.get(&id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    Ok(self.tables.read().users.values().find(|u| u.email == email).cloned())
  }

  async fn insert_user(&self, user: &User) -> Result<()> {
    let mut tables = self.tables.write();
    if tables.users.values().any(|u| u.email == user.email) {
      return Err(BooknestError::Conflict("User already exists with this email.".to_string()));
    }
    tables.users.insert(user.id, user.clone());
    Ok(())
  }

  async fn update_user(&self, user: &User) -> Result<bool> {
    let mut tables = self.tables.write();
    if tables.users.values().any(|u| u.id != user.id && u.email == user.email) {
      return Err(BooknestError::Conflict("Email is already in use.".to_string()));
    }
    match tables.users.get_mut(&user.id) {
      Some(stored) => {
        *stored = User {
          wishlist: std::mem::take(&mut stored.wishlist),
          ..user.clone()
        };
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn add_to_wishlist(&self, user_id: Uuid, book_id: Uuid) -> Result<Option<WishlistUpdate>> {
    Ok(self.tables.write().edit_wishlist(user_id, |wishlist| {
      if wishlist.contains(&book_id) {
        return false;
      }
      wishlist.push(book_id);
      true
    }))
  }

  async fn remove_from_wishlist(&self, user_id: Uuid, book_id: Uuid) -> Result<Option<WishlistUpdate>> {
    Ok(self.tables.write().edit_wishlist(user_id, |wishlist| {
      let before = wishlist.len();
      wishlist.retain(|id| *id != book_id);
      wishlist.len() != before
    }))
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    Ok(self.tables.write().users.remove(&id).is_some())
  }

  async fn users_by_role(&self, role: Role) -> Result<Vec<User>> {
    let tables = self.tables.read();
    let mut users: Vec<User> = tables.users.values().filter(|u| u.role == role).cloned().collect();
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(users)
  }

  async fn count_users_by_role(&self, role: Role) -> Result<u64> {
    Ok(self.tables.read().users.values().filter(|u| u.role == role).count() as u64)
  }
}

#[async_trait]
impl CartStore for MemoryStore {
  async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
    Ok(self.tables.read().carts.get(&user_id).cloned())
  }

  async fn save_cart(&self, cart: &Cart) -> Result<()> {
    self.tables.write().carts.insert(cart.user_id, cart.clone());
    Ok(())
  }

  async fn delete_cart(&self, user_id: Uuid) -> Result<()> {
    self.tables.write().carts.remove(&user_id);
    Ok(())
  }
}

#[async_trait]
impl OrderLedger for MemoryStore {
  async fn insert_order(&self, order: &Order) -> Result<()> {
    let mut tables = self.tables.write();
    tables.ensure_request_unique(order)?;
    let seq = tables.next_seq();
    tables.orders.insert(order.id, (seq, order.clone()));
    Ok(())
  }

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.get(&id).map(|(_, o)| o.clone()))
  }

  async fn delete_order(&self, id: Uuid) -> Result<bool> {
    Ok(self.tables.write().orders.remove(&id).is_some())
  }

  async fn find_order_by_request(&self, user_id: Uuid, request_id: &str) -> Result<Option<Order>> {
    Ok(
      self
        .tables
        .read()
        .orders
        .values()
        .map(|(_, o)| o)
        .find(|o| o.user_id == user_id && o.request_id.as_deref() == Some(request_id))
        .cloned(),
    )
  }

  async fn update_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus, at: DateTime<Utc>) -> Result<bool> {
    let mut tables = self.tables.write();
    match tables.orders.get_mut(&id) {
      Some((_, order)) if order.status == from => {
        order.status = to;
        order.updated_at = at;
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    Ok(
      newest_first(tables.orders.values(), |o: &Order| o.created_at)
        .into_iter()
        .filter(|o| o.user_id == user_id)
        .cloned()
        .collect(),
    )
  }

  async fn all_orders(&self) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    Ok(
      newest_first(tables.orders.values(), |o: &Order| o.created_at)
        .into_iter()
        .cloned()
        .collect(),
    )
  }

  async fn orders_containing_books(&self, book_ids: &[Uuid]) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    Ok(
      newest_first(tables.orders.values(), |o: &Order| o.created_at)
        .into_iter()
        .filter(|o| o.references_any(book_ids))
        .cloned()
        .collect(),
    )
  }

  async fn count_orders(&self) -> Result<u64> {
    Ok(self.tables.read().orders.len() as u64)
  }
}

#[async_trait]
impl CheckoutStore for MemoryStore {
  async fn commit_order(&self, order: &Order) -> Result<()> {
    let mut tables = self.tables.write();
    tables.ensure_request_unique(order)?;

    // Check every line before touching any book.
    let mut needed: HashMap<Uuid, u32> = HashMap::new();
    for line in &order.lines {
      let wanted = needed.entry(line.book_id).or_insert(0);
      *wanted = wanted.saturating_add(line.quantity);
      let available = tables.books.get(&line.book_id).map_or(0, |(_, b)| b.stock);
      if available < *wanted {
        return Err(BooknestError::InsufficientStock {
          book_id: line.book_id,
          title: line.title.clone(),
          requested: *wanted,
          available,
        });
      }
    }

    for (book_id, quantity) in needed {
      if let Some((_, book)) = tables.books.get_mut(&book_id) {
        book.stock -= quantity;
        book.updated_at = order.created_at;
      }
    }
    let seq = tables.next_seq();
    tables.orders.insert(order.id, (seq, order.clone()));
    tables.carts.insert(order.user_id, Cart::empty(order.user_id));
    Ok(())
  }
}
