// booknest/server/src/web/extractors.rs

use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use booknest::{BooknestError, Caller};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// The caller behind the request's `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedCaller(pub Caller);

fn bearer_token(req: &HttpRequest) -> Option<&str> {
  let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

impl FromRequest for AuthenticatedCaller {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("Application state is not configured.".to_string())));
    };
    let caller = state.booknest.resolve_caller(bearer_token(req)).map_err(|e| {
      warn!(error = %e, path = %req.path(), "Rejected unauthenticated request.");
      AppError::from(e)
    });
    ready(caller.map(AuthenticatedCaller))
  }
}

/// The optional `Idempotency-Key` header, trimmed. Non-UTF-8 values are rejected.
pub fn idempotency_key(req: &HttpRequest) -> Result<Option<String>, AppError> {
  let Some(value) = req.headers().get(IDEMPOTENCY_KEY_HEADER) else {
    return Ok(None);
  };
  let key = value
    .to_str()
    .map_err(|_| BooknestError::Validation("Idempotency-Key must be visible ASCII.".to_string()))?
    .trim();
  Ok((!key.is_empty()).then(|| key.to_string()))
}
