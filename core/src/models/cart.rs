// booknest/core/src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
  pub book_id: Uuid,
  /// Always at least 1.
  pub quantity: u32,
}

/// A user's cart. Lines keep the order in which books were first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
  pub user_id: Uuid,
  pub lines: Vec<CartLine>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn empty(user_id: Uuid) -> Self {
    Self {
      user_id,
      lines: Vec::new(),
      updated_at: Utc::now(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub fn quantity_of(&self, book_id: Uuid) -> Option<u32> {
    self.lines.iter().find(|l| l.book_id == book_id).map(|l| l.quantity)
  }

  /// Adds `quantity` units, merging into an existing line for the same book.
  /// A zero quantity is ignored.
  pub fn add(&mut self, book_id: Uuid, quantity: u32) {
    if quantity == 0 {
      return;
    }
    match self.lines.iter_mut().find(|l| l.book_id == book_id) {
      Some(line) => line.quantity = line.quantity.saturating_add(quantity),
      None => self.lines.push(CartLine { book_id, quantity }),
    }
    self.updated_at = Utc::now();
  }

  /// Sets the quantity of an existing line. A quantity of zero removes the
  /// line. Returns `false` when the book is not in the cart.
  pub fn set_quantity(&mut self, book_id: Uuid, quantity: u32) -> bool {
    let Some(idx) = self.lines.iter().position(|l| l.book_id == book_id) else {
      return false;
    };
    if quantity == 0 {
      self.lines.remove(idx);
    } else if let Some(line) = self.lines.get_mut(idx) {
      line.quantity = quantity;
    }
    self.updated_at = Utc::now();
    true
  }

  /// Removes the line for `book_id`. Returns whether a line was removed.
  pub fn remove(&mut self, book_id: Uuid) -> bool {
    let before = self.lines.len();
    self.lines.retain(|l| l.book_id != book_id);
    let removed = self.lines.len() != before;
    if removed {
      self.updated_at = Utc::now();
    }
    removed
  }

  pub fn clear(&mut self) {
    if !self.lines.is_empty() {
      self.lines.clear();
      self.updated_at = Utc::now();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_merges_existing_lines() {
    let book = Uuid::new_v4();
    let mut cart = Cart::empty(Uuid::new_v4());
    cart.add(book, 2);
    cart.add(book, 3);
    assert_eq!(cart.lines, vec![CartLine { book_id: book, quantity: 5 }]);
  }

  #[test]
  fn zero_quantity_removes_instead_of_storing_zero() {
    let book = Uuid::new_v4();
    let mut cart = Cart::empty(Uuid::new_v4());
    cart.add(book, 1);
    assert!(cart.set_quantity(book, 0));
    assert!(cart.is_empty());
    assert!(!cart.set_quantity(book, 4));
  }
}
