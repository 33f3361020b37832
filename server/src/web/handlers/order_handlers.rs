// booknest/server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use booknest::models::{OrderStatus, PlaceOrderRequest};
use booknest::BooknestError;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::{idempotency_key, AuthenticatedCaller};

#[derive(Deserialize, Debug)]
pub struct StatusUpdatePayload {
  pub status: OrderStatus,
}

/// Places an order. The `Idempotency-Key` header, when present, is the
/// request id; a replay answers 200 with the original order instead of 201.
#[instrument(
  name = "handler::place_order",
  skip(app_state, req, auth, payload),
  fields(user_id = %auth.0.user_id, lines = payload.lines.len())
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  auth: AuthenticatedCaller,
  payload: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
  let mut request = payload.into_inner();
  if let Some(key) = idempotency_key(&req)? {
    match request.request_id.as_deref() {
      Some(body_id) if body_id != key => {
        warn!("Idempotency-Key header and body request_id disagree.");
        return Err(BooknestError::Validation("Idempotency-Key does not match request_id.".to_string()).into());
      }
      _ => request.request_id = Some(key),
    }
  }

  let placement = app_state.booknest.checkout.place(&auth.0, request).await?;
  if placement.replayed {
    info!(order_id = %placement.order.id, "Returning previously placed order.");
    return Ok(HttpResponse::Ok().json(placement.order));
  }
  Ok(HttpResponse::Created().json(placement.order))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.booknest.orders.list(&auth.0).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::my_orders", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn my_orders_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.booknest.orders.my_orders(&auth.0).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(
  name = "handler::get_order",
  skip(app_state, auth, path),
  fields(user_id = %auth.0.user_id, order_id = %path.as_ref())
)]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.booknest.orders.get(&auth.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(
  name = "handler::update_order_status",
  skip(app_state, auth, path, payload),
  fields(user_id = %auth.0.user_id, order_id = %path.as_ref(), status = %payload.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<Uuid>,
  payload: web::Json<StatusUpdatePayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .booknest
    .orders
    .update_status(&auth.0, path.into_inner(), payload.status)
    .await?;
  Ok(HttpResponse::Ok().json(order))
}
