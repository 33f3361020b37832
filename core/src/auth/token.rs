// booknest/core/src/auth/token.rs

//! Bearer tokens of the form `base64url(claims_json).base64url(hmac_sha256)`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::access::Caller;
use crate::error::{BooknestError, Result};
use crate::models::Role;
use crate::settings::MAX_TOKEN_TTL_HOURS;

type HmacSha256 = Hmac<Sha256>;

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub role: Role,
  /// Expiry, seconds since the Unix epoch.
  pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
  secret: Vec<u8>,
  ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenIssuer")
      .field("secret", &"[REDACTED]")
      .field("ttl", &self.ttl)
      .finish()
  }
}

fn rejected(reason: &str) -> BooknestError {
  warn!(reason, "Token rejected.");
  BooknestError::Unauthenticated("Not authorized, token failed.".to_string())
}

impl TokenIssuer {
  pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Result<Self> {
    let secret = secret.into();
    if secret.len() < MIN_SECRET_LEN {
      return Err(BooknestError::Validation(format!(
        "Token secret must be at least {} bytes.",
        MIN_SECRET_LEN
      )));
    }
    if ttl <= Duration::zero() || ttl > Duration::hours(MAX_TOKEN_TTL_HOURS) {
      return Err(BooknestError::Validation(format!(
        "Token lifetime must be between 1 second and {} hours.",
        MAX_TOKEN_TTL_HOURS
      )));
    }
    Ok(Self { secret, ttl })
  }

  fn mac(&self) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(&self.secret).map_err(|e| BooknestError::Internal(e.to_string()))
  }

  pub fn issue(&self, caller: &Caller) -> Result<String> {
    self.issue_at(caller, Utc::now())
  }

  /// Issues a token as if the current time were `now`.
  pub fn issue_at(&self, caller: &Caller, now: DateTime<Utc>) -> Result<String> {
    let claims = Claims {
      sub: caller.user_id,
      role: caller.role,
      exp: now
        .checked_add_signed(self.ttl)
        .ok_or_else(|| BooknestError::Internal("Token expiry is out of range.".to_string()))?
        .timestamp(),
    };
    let payload = serde_json::to_vec(&claims).map_err(|e| BooknestError::Internal(e.to_string()))?;
    let payload = URL_SAFE_NO_PAD.encode(payload);

    let mut mac = self.mac()?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{}.{}", payload, signature))
  }

  pub fn verify(&self, token: &str) -> Result<Claims> {
    self.verify_at(token, Utc::now())
  }

  /// Checks signature and expiry. Every failure is `Unauthenticated`.
  pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
    let (payload, signature) = token.trim().split_once('.').ok_or_else(|| rejected("malformed"))?;
    let signature = URL_SAFE_NO_PAD
      .decode(signature)
      .map_err(|_| rejected("signature encoding"))?;

    let mut mac = self.mac()?;
    mac.update(payload.as_bytes());
    // Constant-time comparison.
    mac.verify_slice(&signature).map_err(|_| rejected("signature mismatch"))?;

    let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| rejected("payload encoding"))?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| rejected("payload format"))?;
    if claims.exp <= now.timestamp() {
      return Err(rejected("expired"));
    }
    Ok(claims)
  }

  /// Turns a bearer credential into the caller it was issued to.
  #[instrument(name = "auth::resolve_caller", skip_all, err(Display))]
  pub fn resolve_caller(&self, credential: Option<&str>) -> Result<Caller> {
    let token = credential
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .ok_or_else(|| BooknestError::Unauthenticated("Not authorized, no token.".to_string()))?;
    let claims = self.verify(token)?;
    debug!(user_id = %claims.sub, role = %claims.role, "Caller resolved.");
    Ok(Caller::new(claims.sub, claims.role))
  }
}
