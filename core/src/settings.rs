// booknest/core/src/settings.rs

use chrono::Duration;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;
/// One year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 8760;

/// Runtime knobs for the core. Built by the host from its own configuration.
#[derive(Clone)]
pub struct Settings {
  pub token_secret: String,
  pub token_ttl: Duration,
  /// Put stock back when an order is cancelled.
  pub restock_on_cancel: bool,
}

impl Settings {
  pub fn new(token_secret: impl Into<String>) -> Self {
    Self {
      token_secret: token_secret.into(),
      token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
      restock_on_cancel: false,
    }
  }

  pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
    self.token_ttl = ttl;
    self
  }

  pub fn with_restock_on_cancel(mut self, restock: bool) -> Self {
    self.restock_on_cancel = restock;
    self
  }
}

impl std::fmt::Debug for Settings {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Settings")
      .field("token_secret", &"[REDACTED]")
      .field("token_ttl", &self.token_ttl)
      .field("restock_on_cancel", &self.restock_on_cancel)
      .finish()
  }
}
