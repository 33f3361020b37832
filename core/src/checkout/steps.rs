// booknest/core/src/checkout/steps.rs

//! Handlers of the order placement pipeline, one per step.

use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::checkout::context::PlaceOrderCtxData;
use crate::error::{BooknestError, Result};
use crate::models::{Cart, LineItem, Order, OrderStatus};
use crate::pipeline::{ContextData, PipelineControl};

pub(crate) async fn validate_request(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let (shipping_address, request_id, quantities) = ctx_data.read_with(|ctx| -> Result<_> {
    let request = &ctx.request;
    if request.lines.is_empty() {
      return Err(BooknestError::Validation("No books in order.".to_string()));
    }

    let mut quantities = Vec::with_capacity(request.lines.len());
    for line in &request.lines {
      if line.quantity < 1 {
        return Err(BooknestError::Validation(format!(
          "Quantity for book {} must be at least 1.",
          line.book_id
        )));
      }
      let quantity = u32::try_from(line.quantity)
        .map_err(|_| BooknestError::Validation(format!("Quantity {} is too large.", line.quantity)))?;
      quantities.push((line.book_id, quantity));
    }

    let shipping_address = request.shipping_address.validated()?;
    let request_id = request
      .request_id
      .as_deref()
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .map(str::to_string);
    Ok((shipping_address, request_id, quantities))
  })?;

  ctx_data.write_with(|ctx| {
    ctx.shipping_address = Some(shipping_address);
    ctx.request_id = request_id;
    ctx.quantities = quantities;
  });
  Ok(PipelineControl::Continue)
}

/// Stops the run with the earlier order when the request id was seen before.
pub(crate) async fn find_replayed_order(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let (stores, user_id, request_id) =
    ctx_data.read_with(|ctx| (ctx.stores.clone(), ctx.caller.user_id, ctx.request_id.clone()));
  let Some(request_id) = request_id else {
    return Ok(PipelineControl::Continue);
  };

  match stores.orders.find_order_by_request(user_id, &request_id).await? {
    Some(existing) => {
      info!(order_id = %existing.id, %request_id, "Replayed order request, returning existing order.");
      ctx_data.write_with(|ctx| {
        ctx.order = Some(existing);
        ctx.replayed = true;
      });
      Ok(PipelineControl::Stop)
    }
    None => Ok(PipelineControl::Continue),
  }
}

/// Looks up every book, checks stock and snapshots prices. Read-only.
pub(crate) async fn price_lines(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let (stores, quantities) = ctx_data.read_with(|ctx| (ctx.stores.clone(), ctx.quantities.clone()));

  let mut lines = Vec::with_capacity(quantities.len());
  let mut requested: HashMap<Uuid, u32> = HashMap::new();
  let mut total: i64 = 0;

  for (book_id, quantity) in quantities {
    let book = stores
      .catalog
      .get_book(book_id)
      .await?
      .ok_or_else(|| BooknestError::not_found("Book", book_id))?;

    // The same book may appear on several lines.
    let wanted = requested.entry(book_id).or_insert(0);
    *wanted = wanted.saturating_add(quantity);
    if book.stock < *wanted {
      warn!(%book_id, requested = *wanted, available = book.stock, "Insufficient stock.");
      return Err(BooknestError::InsufficientStock {
        book_id,
        title: book.title,
        requested: *wanted,
        available: book.stock,
      });
    }

    let line = LineItem {
      book_id,
      title: book.title,
      quantity,
      unit_price: book.price,
    };
    total = line
      .subtotal()
      .and_then(|subtotal| total.checked_add(subtotal))
      .ok_or_else(|| BooknestError::Validation("Order total is too large.".to_string()))?;
    lines.push(line);
  }

  debug!(total, lines = lines.len(), "Order priced.");
  ctx_data.write_with(|ctx| {
    ctx.lines = lines;
    ctx.total_amount = total;
  });
  Ok(PipelineControl::Continue)
}

/// Conditionally decrements each book's stock. Losing a race against another
/// order fails the step; compensation returns what was already taken.
pub(crate) async fn reserve_stock(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let (stores, lines) = ctx_data.read_with(|ctx| (ctx.stores.clone(), ctx.lines.clone()));

  for line in lines {
    if !stores.catalog.decrement_stock(line.book_id, line.quantity).await? {
      let available = stores.catalog.get_book(line.book_id).await?.map_or(0, |b| b.stock);
      warn!(book_id = %line.book_id, requested = line.quantity, available, "Stock changed during checkout.");
      return Err(BooknestError::InsufficientStock {
        book_id: line.book_id,
        title: line.title,
        requested: line.quantity,
        available,
      });
    }
    ctx_data.write_with(|ctx| ctx.reserved.push((line.book_id, line.quantity)));
  }
  Ok(PipelineControl::Continue)
}

pub(crate) async fn release_stock(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<()> {
  let (stores, reserved) = ctx_data.write_with(|ctx| (ctx.stores.clone(), std::mem::take(&mut ctx.reserved)));

  let mut failed = Vec::new();
  for (book_id, quantity) in reserved {
    match stores.catalog.restore_stock(book_id, quantity).await {
      Ok(()) => debug!(%book_id, quantity, "Stock restored."),
      Err(e) => {
        error!(%book_id, quantity, error = %e, "Failed to restore stock.");
        failed.push((book_id, quantity));
      }
    }
  }

  if failed.is_empty() {
    return Ok(());
  }
  let count = failed.len();
  ctx_data.write_with(|ctx| ctx.reserved = failed);
  Err(BooknestError::Internal(format!("{} stock reservation(s) could not be released.", count)))
}

fn pending_order(ctx: &PlaceOrderCtxData) -> Result<Order> {
  let shipping_address = ctx
    .shipping_address
    .clone()
    .ok_or_else(|| BooknestError::Internal("Shipping address was not validated.".to_string()))?;
  let now = Utc::now();
  Ok(Order {
    id: Uuid::new_v4(),
    user_id: ctx.caller.user_id,
    lines: ctx.lines.clone(),
    shipping_address,
    total_amount: ctx.total_amount,
    status: OrderStatus::Pending,
    request_id: ctx.request_id.clone(),
    created_at: now,
    updated_at: now,
  })
}

/// Commits stock, order and cart in one store call when the backend can.
/// Stops the run on success; otherwise the per-record steps follow.
pub(crate) async fn commit_placement(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let prepared = ctx_data.read_with(|ctx| match &ctx.stores.checkout {
    Some(checkout) => pending_order(ctx).map(|order| Some((checkout.clone(), order))),
    None => Ok(None),
  })?;
  let Some((checkout, order)) = prepared else {
    return Ok(PipelineControl::Continue);
  };

  checkout.commit_order(&order).await?;
  info!(order_id = %order.id, total_amount = order.total_amount, "Order committed.");
  ctx_data.write_with(|ctx| ctx.order = Some(order));
  Ok(PipelineControl::Stop)
}

pub(crate) async fn record_order(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let (stores, order) = ctx_data.read_with(|ctx| -> Result<_> { Ok((ctx.stores.clone(), pending_order(ctx)?)) })?;

  stores.orders.insert_order(&order).await?;
  info!(order_id = %order.id, total_amount = order.total_amount, "Order recorded.");
  ctx_data.write_with(|ctx| ctx.order = Some(order));
  Ok(PipelineControl::Continue)
}

pub(crate) async fn discard_order(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<()> {
  let (stores, order) = ctx_data.write_with(|ctx| (ctx.stores.clone(), ctx.order.take()));
  let Some(order) = order else {
    return Ok(());
  };

  match stores.orders.delete_order(order.id).await {
    Ok(_) => {
      debug!(order_id = %order.id, "Recorded order discarded.");
      Ok(())
    }
    Err(e) => {
      error!(order_id = %order.id, error = %e, "Failed to discard recorded order.");
      Err(e)
    }
  }
}

pub(crate) async fn clear_cart(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let (stores, user_id) = ctx_data.read_with(|ctx| (ctx.stores.clone(), ctx.caller.user_id));

  if let Some(mut cart) = stores.carts.get_cart(user_id).await? {
    if !cart.is_empty() {
      cart.clear();
      stores.carts.save_cart(&cart).await?;
    }
  } else {
    stores.carts.save_cart(&Cart::empty(user_id)).await?;
  }
  debug!(%user_id, "Cart cleared after checkout.");
  Ok(PipelineControl::Continue)
}
