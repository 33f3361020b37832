// booknest/core/src/checkout/mod.rs

//! Order placement.
//!
//! Placing an order runs a [`Pipeline`] of seven steps:
//!
//! | step                  | compensation           |
//! |-----------------------|------------------------|
//! | `validate_request`    |                        |
//! | `find_replayed_order` |                        |
//! | `price_lines`         |                        |
//! | `commit_placement`    |                        |
//! | `reserve_stock`       | restore reserved stock |
//! | `record_order`        | delete recorded order  |
//! | `clear_cart`          |                        |
//!
//! Nothing is written before `commit_placement`, so failures up to and
//! including pricing have no side effects. When the stores offer a
//! [`CheckoutStore`](crate::store::CheckoutStore), `commit_placement` writes
//! stock, order and emptied cart in one atomic call and stops the run.
//! Otherwise the last three steps write one record each and a failure in any
//! of them undoes the earlier ones. That path can still leave stock
//! decremented with no order if the process dies between `reserve_stock` and
//! `record_order`.

pub mod context;
mod steps;

pub use context::PlaceOrderCtxData;

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::access::{authorize, Caller, Capability};
use crate::error::{BooknestError, Result};
use crate::models::{Order, PlaceOrderRequest};
use crate::pipeline::{ContextData, Pipeline, PipelineResult};
use crate::store::Stores;

pub const PLACE_ORDER_STEPS: &[(&str, bool)] = &[
  ("validate_request", false),
  ("find_replayed_order", false),
  ("price_lines", false),
  ("commit_placement", false),
  ("reserve_stock", false),
  ("record_order", false),
  ("clear_cart", false),
];

pub fn build_place_order_pipeline() -> Pipeline<PlaceOrderCtxData, BooknestError> {
  let mut p = Pipeline::<PlaceOrderCtxData, BooknestError>::new(PLACE_ORDER_STEPS);
  p.on_step("validate_request", steps::validate_request)
    .on_step("find_replayed_order", steps::find_replayed_order)
    .on_step("price_lines", steps::price_lines)
    .on_step("commit_placement", steps::commit_placement)
    .on_step("reserve_stock", steps::reserve_stock)
    .compensate_step("reserve_stock", steps::release_stock)
    .on_step("record_order", steps::record_order)
    .compensate_step("record_order", steps::discard_order)
    .on_step("clear_cart", steps::clear_cart);
  p
}

/// Outcome of [`OrderPlacementEngine::place_order`].
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
  pub order: Order,
  /// The order already existed for this request id and was returned as is.
  pub replayed: bool,
}

#[derive(Clone)]
pub struct OrderPlacementEngine {
  stores: Stores,
  pipeline: Arc<Pipeline<PlaceOrderCtxData, BooknestError>>,
}

impl OrderPlacementEngine {
  pub fn new(stores: Stores) -> Self {
    Self {
      stores,
      pipeline: Arc::new(build_place_order_pipeline()),
    }
  }

  pub async fn place_order(&self, caller: &Caller, request: PlaceOrderRequest) -> Result<Order> {
    self.place(caller, request).await.map(|placement| placement.order)
  }

  #[instrument(
    name = "checkout::place_order",
    skip(self, request),
    fields(user_id = %caller.user_id, lines = request.lines.len()),
    err(Display)
  )]
  pub async fn place(&self, caller: &Caller, request: PlaceOrderRequest) -> Result<Placement> {
    authorize(caller, Capability::PlaceOrder)?;
    let request_id = request.request_id.clone();

    let ctx_data = ContextData::new(PlaceOrderCtxData::new(self.stores.clone(), *caller, request));
    match self.pipeline.run(ctx_data.clone()).await {
      Ok(PipelineResult::Completed) | Ok(PipelineResult::Stopped) => {}
      Err(BooknestError::Conflict(msg)) => {
        // Another request with the same id won the race to the ledger.
        return match self.existing_order(caller, request_id.as_deref()).await? {
          Some(order) => Ok(Placement { order, replayed: true }),
          None => Err(BooknestError::Conflict(msg)),
        };
      }
      Err(e) => return Err(e),
    }

    let (order, replayed) = ctx_data.write_with(|ctx| (ctx.order.take(), ctx.replayed));
    let order = order.ok_or_else(|| BooknestError::Internal("Order placement produced no order.".to_string()))?;
    if replayed {
      warn!(order_id = %order.id, "Duplicate order submission.");
    } else {
      info!(order_id = %order.id, total_amount = order.total_amount, "Order placed.");
    }
    Ok(Placement { order, replayed })
  }

  async fn existing_order(&self, caller: &Caller, request_id: Option<&str>) -> Result<Option<Order>> {
    match request_id.map(str::trim).filter(|id| !id.is_empty()) {
      Some(request_id) => self.stores.orders.find_order_by_request(caller.user_id, request_id).await,
      None => Ok(None),
    }
  }
}
