// booknest/core/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{BooknestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }

  // Position along the fulfilment path. Cancelled sits outside it.
  fn rank(&self) -> Option<u8> {
    match self {
      OrderStatus::Pending => Some(0),
      OrderStatus::Processing => Some(1),
      OrderStatus::Shipped => Some(2),
      OrderStatus::Delivered => Some(3),
      OrderStatus::Cancelled => None,
    }
  }

  /// Forward moves may skip intermediate states. Any non-terminal order may
  /// be cancelled. Nothing leaves a terminal state.
  pub fn can_transition_to(&self, next: OrderStatus) -> bool {
    if self.is_terminal() {
      return false;
    }
    match (self.rank(), next.rank()) {
      (_, None) => true,
      (Some(from), Some(to)) => to > from,
      (None, Some(_)) => false,
    }
  }

  pub fn allowed_next(&self) -> Vec<OrderStatus> {
    OrderStatus::ALL
      .iter()
      .copied()
      .filter(|next| self.can_transition_to(*next))
      .collect()
  }

  /// Checked transition, returning the new status.
  pub fn transition(self, next: OrderStatus) -> Result<OrderStatus> {
    if self.can_transition_to(next) {
      Ok(next)
    } else {
      Err(BooknestError::InvalidTransition { from: self, to: next })
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = BooknestError;

  fn from_str(s: &str) -> Result<Self> {
    OrderStatus::ALL
      .iter()
      .copied()
      .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| BooknestError::Validation(format!("Invalid status '{}'.", s)))
  }
}

/// A priced line, snapshotted from the catalog when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
  pub book_id: Uuid,
  pub title: String,
  pub quantity: u32,
  pub unit_price: i64,
}

impl LineItem {
  pub fn subtotal(&self) -> Option<i64> {
    self.unit_price.checked_mul(i64::from(self.quantity))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
  pub address: String,
  pub city: String,
  pub postal_code: String,
  pub country: String,
}

impl ShippingAddress {
  /// Returns a trimmed copy, rejecting blank fields.
  pub fn validated(&self) -> Result<Self> {
    let field = |name: &str, value: &str| -> Result<String> {
      let value = value.trim();
      if value.is_empty() {
        return Err(BooknestError::Validation(format!("Shipping {} is required.", name)));
      }
      Ok(value.to_string())
    };
    Ok(Self {
      address: field("address", &self.address)?,
      city: field("city", &self.city)?,
      postal_code: field("postal code", &self.postal_code)?,
      country: field("country", &self.country)?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub lines: Vec<LineItem>,
  pub shipping_address: ShippingAddress,
  pub total_amount: i64,
  pub status: OrderStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  pub fn references_any(&self, book_ids: &[Uuid]) -> bool {
    self.lines.iter().any(|l| book_ids.contains(&l.book_id))
  }
}

/// Sum of every line's `unit_price * quantity`, or `None` on overflow.
pub fn lines_total(lines: &[LineItem]) -> Option<i64> {
  lines
    .iter()
    .try_fold(0i64, |acc, line| line.subtotal().and_then(|s| acc.checked_add(s)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
  pub book_id: Uuid,
  pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
  pub lines: Vec<OrderLineRequest>,
  pub shipping_address: ShippingAddress,
  #[serde(default)]
  pub request_id: Option<String>,
}
