// booknest/server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use booknest::BooknestError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Domain(#[from] BooknestError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  pub fn kind(&self) -> &'static str {
    match self {
      AppError::Domain(e) => e.kind(),
      AppError::Sqlx(_) | AppError::Migrate(_) => "persistence_failure",
      AppError::Config(_) | AppError::Internal(_) => "internal_error",
    }
  }

  fn public_message(&self) -> String {
    match self {
      AppError::Domain(e) => e.public_message(),
      AppError::Sqlx(_) | AppError::Migrate(_) => "The data store is temporarily unavailable.".to_string(),
      AppError::Config(_) | AppError::Internal(_) => "An internal error occurred.".to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Domain(e) => match e {
        BooknestError::Validation(_) => StatusCode::BAD_REQUEST,
        BooknestError::NotFound { .. } => StatusCode::NOT_FOUND,
        BooknestError::InsufficientStock { .. } => StatusCode::CONFLICT,
        BooknestError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        BooknestError::Unauthorized(_) => StatusCode::FORBIDDEN,
        BooknestError::InvalidTransition { .. } => StatusCode::CONFLICT,
        BooknestError::Conflict(_) => StatusCode::CONFLICT,
        BooknestError::Persistence { .. } => StatusCode::SERVICE_UNAVAILABLE,
        BooknestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Sqlx(_) | AppError::Migrate(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Request rejected");
    }
    HttpResponse::build(status).json(json!({
      "error": {
        "kind": self.kind(),
        "message": self.public_message(),
      }
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
