// booknest/core/src/services/stats.rs

use serde::Serialize;
use tracing::instrument;

use crate::access::{authorize, Caller, Capability};
use crate::error::Result;
use crate::models::{OrderStatus, Role};
use crate::store::Stores;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
  pub total_users: u64,
  pub total_sellers: u64,
  pub total_books: u64,
  pub total_orders: u64,
  /// Sum of totals of every order that is not cancelled.
  pub total_revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerStats {
  pub total_books: u64,
  /// Order lines for the seller's books, across orders that are not cancelled.
  pub total_orders: u64,
  pub total_sales: i64,
}

#[derive(Clone)]
pub struct StatsService {
  stores: Stores,
}

impl StatsService {
  pub fn new(stores: Stores) -> Self {
    Self { stores }
  }

  #[instrument(name = "stats::admin", skip(self), err(Display))]
  pub async fn admin(&self, caller: &Caller) -> Result<AdminStats> {
    authorize(caller, Capability::ViewAdminStats)?;
    let total_revenue = self
      .stores
      .orders
      .all_orders()
      .await?
      .iter()
      .filter(|o| o.status != OrderStatus::Cancelled)
      .fold(0i64, |acc, o| acc.saturating_add(o.total_amount));

    Ok(AdminStats {
      total_users: self.stores.users.count_users_by_role(Role::Shopper).await?,
      total_sellers: self.stores.users.count_users_by_role(Role::Seller).await?,
      total_books: self.stores.catalog.count_books().await?,
      total_orders: self.stores.orders.count_orders().await?,
      total_revenue,
    })
  }

  #[instrument(name = "stats::seller", skip(self), err(Display))]
  pub async fn seller(&self, caller: &Caller) -> Result<SellerStats> {
    authorize(caller, Capability::ViewSellerStats)?;
    let book_ids: Vec<_> = self
      .stores
      .catalog
      .books_by_seller(caller.user_id)
      .await?
      .into_iter()
      .map(|b| b.id)
      .collect();

    let mut stats = SellerStats {
      total_books: book_ids.len() as u64,
      total_orders: 0,
      total_sales: 0,
    };
    if book_ids.is_empty() {
      return Ok(stats);
    }

    let orders = self.stores.orders.orders_containing_books(&book_ids).await?;
    for line in orders
      .iter()
      .filter(|o| o.status != OrderStatus::Cancelled)
      .flat_map(|o| o.lines.iter())
      .filter(|l| book_ids.contains(&l.book_id))
    {
      stats.total_orders += 1;
      stats.total_sales = stats.total_sales.saturating_add(line.subtotal().unwrap_or(i64::MAX));
    }
    Ok(stats)
  }
}
