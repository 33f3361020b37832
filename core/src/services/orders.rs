// booknest/core/src/services/orders.rs

use chrono::Utc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::access::{authorize, Caller, Capability};
use crate::error::{BooknestError, Result};
use crate::models::{Order, OrderStatus, Role};
use crate::store::Stores;

/// Order queries and status changes. Placement lives in [`crate::checkout`].
#[derive(Clone)]
pub struct OrderService {
  stores: Stores,
  restock_on_cancel: bool,
}

impl OrderService {
  pub fn new(stores: Stores, restock_on_cancel: bool) -> Self {
    Self {
      stores,
      restock_on_cancel,
    }
  }

  async fn load(&self, id: Uuid) -> Result<Order> {
    self
      .stores
      .orders
      .get_order(id)
      .await?
      .ok_or_else(|| BooknestError::not_found("Order", id))
  }

  async fn seller_book_ids(&self, seller_id: Uuid) -> Result<Vec<Uuid>> {
    Ok(
      self
        .stores
        .catalog
        .books_by_seller(seller_id)
        .await?
        .into_iter()
        .map(|b| b.id)
        .collect(),
    )
  }

  /// A single order, visible only to the shopper who placed it.
  #[instrument(name = "orders::get", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Order> {
    authorize(caller, Capability::ManageOwnAccount)?;
    let order = self.load(id).await?;
    if order.user_id != caller.user_id {
      warn!(order_id = %id, "Order read by non-owner.");
      return Err(BooknestError::Unauthorized("Not authorized to view this order.".to_string()));
    }
    Ok(order)
  }

  #[instrument(name = "orders::my_orders", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn my_orders(&self, caller: &Caller) -> Result<Vec<Order>> {
    authorize(caller, Capability::ManageOwnAccount)?;
    self.stores.orders.orders_for_user(caller.user_id).await
  }

  /// Every order for an admin; for a seller, orders touching their catalog.
  #[instrument(name = "orders::list", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn list(&self, caller: &Caller) -> Result<Vec<Order>> {
    authorize(caller, Capability::ListOrders)?;
    match caller.role {
      Role::Admin => self.stores.orders.all_orders().await,
      _ => {
        let book_ids = self.seller_book_ids(caller.user_id).await?;
        if book_ids.is_empty() {
          return Ok(Vec::new());
        }
        self.stores.orders.orders_containing_books(&book_ids).await
      }
    }
  }

  #[instrument(name = "orders::update_status", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn update_status(&self, caller: &Caller, id: Uuid, next: OrderStatus) -> Result<Order> {
    authorize(caller, Capability::UpdateOrderStatus)?;
    let mut order = self.load(id).await?;

    if caller.role == Role::Seller {
      let book_ids = self.seller_book_ids(caller.user_id).await?;
      if !order.references_any(&book_ids) {
        warn!(order_id = %id, "Seller has no book in this order.");
        return Err(BooknestError::Unauthorized(
          "Not authorized to update this order.".to_string(),
        ));
      }
    }

    let from = order.status;
    let to = from.transition(next)?;
    let now = Utc::now();
    if !self.stores.orders.update_order_status(id, from, to, now).await? {
      // Someone else moved the order first.
      let current = self.load(id).await?.status;
      return Err(BooknestError::InvalidTransition { from: current, to });
    }
    order.status = to;
    order.updated_at = now;
    info!(order_id = %id, %from, %to, "Order status changed.");

    if to == OrderStatus::Cancelled && self.restock_on_cancel {
      for line in &order.lines {
        if let Err(e) = self.stores.catalog.restore_stock(line.book_id, line.quantity).await {
          error!(order_id = %id, book_id = %line.book_id, error = %e, "Failed to restock cancelled line.");
        }
      }
      info!(order_id = %id, "Cancelled order restocked.");
    }
    Ok(order)
  }
}
