// booknest/server/src/config.rs

use booknest::auth::MIN_SECRET_LEN;
use booknest::settings::{DEFAULT_TOKEN_TTL_HOURS, MAX_TOKEN_TTL_HOURS};
use booknest::Settings;
use chrono::Duration;
use dotenvy::dotenv;
use std::env;

use crate::errors::{AppError, Result};

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// No URL means the in-memory store.
  pub database_url: Option<String>,
  pub token_secret: String,
  pub token_ttl_hours: i64,
  pub restock_on_cancel: bool,
  pub seed_db: bool,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("token_secret", &"[REDACTED]")
      .field("token_ttl_hours", &self.token_ttl_hours)
      .field("restock_on_cancel", &self.restock_on_cancel)
      .field("seed_db", &self.seed_db)
      .finish()
  }
}

fn parse_bool(var_name: &str, value: Option<String>) -> Result<bool> {
  match value {
    None => Ok(false),
    Some(v) => v
      .trim()
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid {} value: {}", var_name, e))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup(get_env: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL").filter(|url| !url.trim().is_empty());

    let token_secret = get_env("TOKEN_SECRET")
      .ok_or_else(|| AppError::Config("Missing environment variable 'TOKEN_SECRET'".to_string()))?;
    if token_secret.len() < MIN_SECRET_LEN {
      return Err(AppError::Config(format!(
        "TOKEN_SECRET must be at least {} bytes long.",
        MIN_SECRET_LEN
      )));
    }

    let token_ttl_hours = match get_env("TOKEN_TTL_HOURS") {
      None => DEFAULT_TOKEN_TTL_HOURS,
      Some(v) => v
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|h| (1..=MAX_TOKEN_TTL_HOURS).contains(h))
        .ok_or_else(|| AppError::Config(format!("Invalid TOKEN_TTL_HOURS: {}", v)))?,
    };

    let restock_on_cancel = parse_bool("RESTOCK_ON_CANCEL", get_env("RESTOCK_ON_CANCEL"))?;
    let seed_db = parse_bool("SEED_DB", get_env("SEED_DB"))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      token_secret,
      token_ttl_hours,
      restock_on_cancel,
      seed_db,
    })
  }

  pub fn settings(&self) -> Settings {
    Settings::new(self.token_secret.clone())
      .with_token_ttl(Duration::hours(self.token_ttl_hours))
      .with_restock_on_cancel(self.restock_on_cancel)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use booknest::store::Stores;
  use booknest::Booknest;
  use std::collections::HashMap;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| vars.get(name).cloned()
  }

  const SECRET: &str = "0123456789abcdef0123456789abcdef";

  #[test]
  fn defaults_apply() {
    let cfg = AppConfig::from_lookup(lookup(&[("TOKEN_SECRET", SECRET)])).unwrap();
    assert_eq!(cfg.server_host, "127.0.0.1");
    assert_eq!(cfg.server_port, 8080);
    assert_eq!(cfg.database_url, None);
    assert_eq!(cfg.token_ttl_hours, 168);
    assert!(!cfg.restock_on_cancel);
    assert!(!cfg.seed_db);
  }

  #[test]
  fn secret_is_required_and_long_enough() {
    assert!(AppConfig::from_lookup(lookup(&[])).is_err());
    assert!(AppConfig::from_lookup(lookup(&[("TOKEN_SECRET", "short")])).is_err());
  }

  #[test]
  fn invalid_values_are_config_errors() {
    let bad_port = AppConfig::from_lookup(lookup(&[("TOKEN_SECRET", SECRET), ("SERVER_PORT", "eighty")]));
    assert!(matches!(bad_port, Err(AppError::Config(_))));
    let bad_flag = AppConfig::from_lookup(lookup(&[("TOKEN_SECRET", SECRET), ("SEED_DB", "yes")]));
    assert!(matches!(bad_flag, Err(AppError::Config(_))));
    let bad_ttl = AppConfig::from_lookup(lookup(&[("TOKEN_SECRET", SECRET), ("TOKEN_TTL_HOURS", "0")]));
    assert!(matches!(bad_ttl, Err(AppError::Config(_))));
  }

  #[test]
  fn token_ttl_is_capped_at_one_year() {
    let huge = AppConfig::from_lookup(lookup(&[("TOKEN_SECRET", SECRET), ("TOKEN_TTL_HOURS", "9223372036854775807")]));
    assert!(matches!(huge, Err(AppError::Config(_))));
    let over = AppConfig::from_lookup(lookup(&[("TOKEN_SECRET", SECRET), ("TOKEN_TTL_HOURS", "8761")]));
    assert!(matches!(over, Err(AppError::Config(_))));

    let year = AppConfig::from_lookup(lookup(&[("TOKEN_SECRET", SECRET), ("TOKEN_TTL_HOURS", "8760")])).unwrap();
    assert_eq!(year.token_ttl_hours, MAX_TOKEN_TTL_HOURS);
    assert!(Booknest::new(Stores::in_memory(), &year.settings()).is_ok());
  }

  #[test]
  fn secret_is_redacted_in_debug() {
    let cfg = AppConfig::from_lookup(lookup(&[("TOKEN_SECRET", SECRET)])).unwrap();
    assert!(!format!("{:?}", cfg).contains(SECRET));
  }
}
