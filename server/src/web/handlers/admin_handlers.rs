// booknest/server/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use booknest::models::Role;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedCaller;

#[instrument(name = "handler::list_shoppers", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn list_users_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
) -> Result<HttpResponse, AppError> {
  let users = app_state.booknest.accounts.list_by_role(&auth.0, Role::Shopper).await?;
  Ok(HttpResponse::Ok().json(users))
}

#[instrument(name = "handler::list_sellers", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn list_sellers_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
) -> Result<HttpResponse, AppError> {
  let sellers = app_state.booknest.accounts.list_by_role(&auth.0, Role::Seller).await?;
  Ok(HttpResponse::Ok().json(sellers))
}

#[instrument(
  name = "handler::delete_user",
  skip(app_state, auth, path),
  fields(user_id = %auth.0.user_id, target_id = %path.as_ref())
)]
pub async fn delete_user_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let target = path.into_inner();
  app_state.booknest.accounts.delete_user(&auth.0, target).await?;
  info!(target_id = %target, "User removed by admin.");
  Ok(HttpResponse::Ok().json(json!({ "message": "User removed." })))
}

#[instrument(name = "handler::admin_stats", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn admin_stats_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
) -> Result<HttpResponse, AppError> {
  let stats = app_state.booknest.stats.admin(&auth.0).await?;
  Ok(HttpResponse::Ok().json(stats))
}

#[instrument(name = "handler::seller_stats", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn seller_stats_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
) -> Result<HttpResponse, AppError> {
  let stats = app_state.booknest.stats.seller(&auth.0).await?;
  Ok(HttpResponse::Ok().json(stats))
}
