// booknest/server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use booknest::services::accounts::{LoginRequest, RegisterRequest};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedCaller;

#[instrument(name = "handler::register", skip(app_state, payload), fields(email = %payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
  let session = app_state.booknest.accounts.register(payload.into_inner()).await?;
  info!(user_id = %session.user.id, role = %session.user.role, "Account registered.");
  Ok(HttpResponse::Created().json(session))
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(email = %payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
  let session = app_state.booknest.accounts.login(payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(session))
}

#[instrument(name = "handler::me", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn me_handler(app_state: web::Data<AppState>, auth: AuthenticatedCaller) -> Result<HttpResponse, AppError> {
  let user = app_state.booknest.accounts.profile(&auth.0).await?;
  Ok(HttpResponse::Ok().json(user))
}
