// booknest/server/src/web/handlers/user_handlers.rs

//! Profile, wishlist and cart endpoints for the signed-in user.

use actix_web::{web, HttpResponse};
use booknest::models::ProfileUpdate;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedCaller;

#[derive(Deserialize, Debug)]
pub struct AddToCartPayload {
  pub book_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i64,
}

fn default_quantity() -> i64 {
  1
}

#[derive(Deserialize, Debug)]
pub struct CartQuantityPayload {
  pub quantity: i64,
}

#[instrument(name = "handler::get_profile", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn get_profile_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
) -> Result<HttpResponse, AppError> {
  let user = app_state.booknest.accounts.profile(&auth.0).await?;
  Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::update_profile", skip(app_state, auth, payload), fields(user_id = %auth.0.user_id))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  payload: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
  let user = app_state
    .booknest
    .accounts
    .update_profile(&auth.0, payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(user))
}

#[instrument(
  name = "handler::add_to_wishlist",
  skip(app_state, auth, path),
  fields(user_id = %auth.0.user_id, book_id = %path.as_ref())
)]
pub async fn add_to_wishlist_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let wishlist = app_state
    .booknest
    .accounts
    .add_to_wishlist(&auth.0, path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "wishlist": wishlist })))
}

#[instrument(
  name = "handler::remove_from_wishlist",
  skip(app_state, auth, path),
  fields(user_id = %auth.0.user_id, book_id = %path.as_ref())
)]
pub async fn remove_from_wishlist_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let wishlist = app_state
    .booknest
    .accounts
    .remove_from_wishlist(&auth.0, path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "wishlist": wishlist })))
}

#[instrument(name = "handler::get_cart", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn get_cart_handler(app_state: web::Data<AppState>, auth: AuthenticatedCaller) -> Result<HttpResponse, AppError> {
  let cart = app_state.booknest.carts.get(&auth.0).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, auth, payload),
  fields(user_id = %auth.0.user_id, book_id = %payload.book_id, quantity = payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  payload: web::Json<AddToCartPayload>,
) -> Result<HttpResponse, AppError> {
  let cart = app_state
    .booknest
    .carts
    .add_item(&auth.0, payload.book_id, payload.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::update_cart_item",
  skip(app_state, auth, path, payload),
  fields(user_id = %auth.0.user_id, book_id = %path.as_ref(), quantity = payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<Uuid>,
  payload: web::Json<CartQuantityPayload>,
) -> Result<HttpResponse, AppError> {
  let cart = app_state
    .booknest
    .carts
    .set_item_quantity(&auth.0, path.into_inner(), payload.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::remove_cart_item",
  skip(app_state, auth, path),
  fields(user_id = %auth.0.user_id, book_id = %path.as_ref())
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.booknest.carts.remove_item(&auth.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>, auth: AuthenticatedCaller) -> Result<HttpResponse, AppError> {
  let cart = app_state.booknest.carts.clear(&auth.0).await?;
  Ok(HttpResponse::Ok().json(cart))
}
