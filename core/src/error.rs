// booknest/core/src/error.rs

//! The error taxonomy shared by every BookNest operation.
//!
//! Each variant maps to a stable, machine-readable [`BooknestError::kind`] string
//! so that outer layers (HTTP, CLI) can report failures without leaking internals.

use anyhow::Error as AnyhowError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::OrderStatus;
use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum BooknestError {
  /// Missing or malformed input. Nothing was mutated.
  #[error("Validation error: {0}")]
  Validation(String),

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  #[error("Insufficient stock for '{title}': requested {requested}, available {available}")]
  InsufficientStock {
    book_id: Uuid,
    title: String,
    requested: u32,
    available: u32,
  },

  /// No credential, or a credential that failed verification.
  #[error("Unauthenticated: {0}")]
  Unauthenticated(String),

  /// Authenticated, but the role or ownership does not allow the operation.
  #[error("Unauthorized: {0}")]
  Unauthorized(String),

  #[error("Order status cannot move from {from} to {to}")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Conflict: {0}")]
  Conflict(String),

  /// The underlying store failed. Transient from the caller's point of view.
  #[error("Persistence failure: {source}")]
  Persistence {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal error: {0}")]
  Internal(String),
}

impl BooknestError {
  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    BooknestError::NotFound {
      entity,
      id: id.to_string(),
    }
  }

  pub fn persistence(source: impl Into<AnyhowError>) -> Self {
    BooknestError::Persistence { source: source.into() }
  }

  /// Stable identifier reported alongside the human-readable message.
  pub fn kind(&self) -> &'static str {
    match self {
      BooknestError::Validation(_) => "validation_error",
      BooknestError::NotFound { .. } => "not_found",
      BooknestError::InsufficientStock { .. } => "insufficient_stock",
      BooknestError::Unauthenticated(_) => "unauthenticated",
      BooknestError::Unauthorized(_) => "unauthorized",
      BooknestError::InvalidTransition { .. } => "invalid_transition",
      BooknestError::Conflict(_) => "conflict",
      BooknestError::Persistence { .. } => "persistence_failure",
      BooknestError::Internal(_) => "internal_error",
    }
  }

  /// Message safe to show to an end user. Store and internal failures are
  /// reported generically.
  pub fn public_message(&self) -> String {
    match self {
      BooknestError::Persistence { .. } => "The data store is temporarily unavailable.".to_string(),
      BooknestError::Internal(_) => "An internal error occurred.".to_string(),
      other => other.to_string(),
    }
  }
}

impl From<PipelineError> for BooknestError {
  fn from(err: PipelineError) -> Self {
    BooknestError::Internal(err.to_string())
  }
}

pub type Result<T, E = BooknestError> = std::result::Result<T, E>;
