// booknest/server/src/db/mod.rs

//! Postgres-backed stores.

pub mod pg_store;
mod rows;

pub use pg_store::PgStore;

use booknest::BooknestError;

/// Unique violations become `Conflict`; everything else is a persistence failure.
pub(crate) fn db_error(err: sqlx::Error, conflict_message: &str) -> BooknestError {
  let unique = err
    .as_database_error()
    .map_or(false, |db_err| db_err.is_unique_violation());
  if unique {
    return BooknestError::Conflict(conflict_message.to_string());
  }
  tracing::error!(error = %err, "Database operation failed.");
  BooknestError::persistence(err)
}
