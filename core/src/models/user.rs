// booknest/core/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{BooknestError, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

/// The single role an account holds for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[serde(alias = "user")]
  Shopper,
  Seller,
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Shopper => "shopper",
      Role::Seller => "seller",
      Role::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = BooknestError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "shopper" | "user" => Ok(Role::Shopper),
      "seller" => Ok(Role::Seller),
      "admin" => Ok(Role::Admin),
      other => Err(BooknestError::Validation(format!("Unknown role '{}'.", other))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send the password hash to a client
  pub password_hash: String,
  pub role: Role,
  /// Wishlisted book ids, in the order they were added, without duplicates.
  pub wishlist: Vec<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Profile changes a user may make to their own account. Role is not editable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
  pub name: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>,
}

/// Trims and lowercases an email, rejecting obviously malformed input.
pub fn normalize_email(email: &str) -> Result<String> {
  let email = email.trim().to_lowercase();
  let well_formed = match email.split_once('@') {
    Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
    None => false,
  };
  if !well_formed {
    return Err(BooknestError::Validation("Valid email is required.".to_string()));
  }
  Ok(email)
}

pub fn validate_name(name: &str) -> Result<String> {
  let name = name.trim();
  if name.is_empty() {
    return Err(BooknestError::Validation("Please provide a name.".to_string()));
  }
  Ok(name.to_string())
}

pub fn validate_password(password: &str) -> Result<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(BooknestError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn legacy_user_role_reads_as_shopper() {
    let role: Role = serde_json::from_str("\"user\"").unwrap();
    assert_eq!(role, Role::Shopper);
    assert_eq!("USER".parse::<Role>().unwrap(), Role::Shopper);
    assert_eq!(serde_json::to_string(&Role::Shopper).unwrap(), "\"shopper\"");
  }

  #[test]
  fn emails_are_normalized() {
    assert_eq!(normalize_email("  Jane@BookNest.com ").unwrap(), "jane@booknest.com");
    assert!(normalize_email("not-an-email").is_err());
    assert!(normalize_email("@booknest.com").is_err());
  }

  #[test]
  fn password_hash_is_never_serialized() {
    let user = User {
      id: Uuid::new_v4(),
      name: "Jane".to_string(),
      email: "jane@booknest.com".to_string(),
      password_hash: "$argon2id$secret".to_string(),
      role: Role::Shopper,
      wishlist: Vec::new(),
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };
    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("argon2"));
    assert!(!json.contains("password"));
  }
}
