// booknest/core/src/services/accounts.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{authorize, Caller, Capability};
use crate::auth::{hash_password, verify_password, TokenIssuer};
use crate::error::{BooknestError, Result};
use crate::models::user::{normalize_email, validate_name, validate_password};
use crate::models::{ProfileUpdate, Role, User};
use crate::store::Stores;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
  pub name: String,
  pub email: String,
  pub password: String,
  /// Defaults to shopper. Admin accounts cannot self-register.
  #[serde(default)]
  pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

/// A freshly issued token and the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
  pub token: String,
  pub user: User,
}

#[derive(Clone)]
pub struct AccountService {
  stores: Stores,
  tokens: TokenIssuer,
}

impl AccountService {
  pub fn new(stores: Stores, tokens: TokenIssuer) -> Self {
    Self { stores, tokens }
  }

  fn session_for(&self, user: User) -> Result<Session> {
    let token = self.tokens.issue(&Caller::new(user.id, user.role))?;
    Ok(Session { token, user })
  }

  /// Creates an account with any role, bypassing the self-registration
  /// rules. Used by seeding.
  pub async fn create_account(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User> {
    let name = validate_name(name)?;
    let email = normalize_email(email)?;
    validate_password(password)?;

    if self.stores.users.find_user_by_email(&email).await?.is_some() {
      return Err(BooknestError::Conflict("User already exists with this email.".to_string()));
    }

    let now = Utc::now();
    let user = User {
      id: Uuid::new_v4(),
      name,
      email,
      password_hash: hash_password(password)?,
      role,
      wishlist: Vec::new(),
      created_at: now,
      updated_at: now,
    };
    self.stores.users.insert_user(&user).await?;
    info!(user_id = %user.id, role = %user.role, "Account created.");
    Ok(user)
  }

  #[instrument(name = "accounts::register", skip_all, fields(email = %req.email), err(Display))]
  pub async fn register(&self, req: RegisterRequest) -> Result<Session> {
    let role = req.role.unwrap_or(Role::Shopper);
    if role == Role::Admin {
      return Err(BooknestError::Validation("Role must be shopper or seller.".to_string()));
    }
    let user = self.create_account(&req.name, &req.email, &req.password, role).await?;
    self.session_for(user)
  }

  #[instrument(name = "accounts::login", skip_all, fields(email = %req.email), err(Display))]
  pub async fn login(&self, req: LoginRequest) -> Result<Session> {
    let invalid = || BooknestError::Unauthenticated("Invalid credentials.".to_string());
    let email = normalize_email(&req.email).map_err(|_| invalid())?;

    let Some(user) = self.stores.users.find_user_by_email(&email).await? else {
      warn!("Login for unknown email.");
      return Err(invalid());
    };
    if !verify_password(&user.password_hash, &req.password)? {
      warn!(user_id = %user.id, "Login with wrong password.");
      return Err(invalid());
    }
    info!(user_id = %user.id, "User logged in.");
    self.session_for(user)
  }

  #[instrument(name = "accounts::profile", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn profile(&self, caller: &Caller) -> Result<User> {
    authorize(caller, Capability::ManageOwnAccount)?;
    self
      .stores
      .users
      .get_user(caller.user_id)
      .await?
      .ok_or_else(|| BooknestError::not_found("User", caller.user_id))
  }

  #[instrument(name = "accounts::update_profile", skip(self, update), fields(user_id = %caller.user_id), err(Display))]
  pub async fn update_profile(&self, caller: &Caller, update: ProfileUpdate) -> Result<User> {
    let mut user = self.profile(caller).await?;

    let name = update.name.as_deref().map(validate_name).transpose()?;
    let email = update.email.as_deref().map(normalize_email).transpose()?;
    let password_hash = match update.password.as_deref() {
      Some(password) => {
        validate_password(password)?;
        Some(hash_password(password)?)
      }
      None => None,
    };

    if let Some(name) = name {
      user.name = name;
    }
    if let Some(email) = email {
      user.email = email;
    }
    if let Some(hash) = password_hash {
      user.password_hash = hash;
    }
    user.updated_at = Utc::now();

    if !self.stores.users.update_user(&user).await? {
      return Err(BooknestError::not_found("User", user.id));
    }
    info!("Profile updated.");
    Ok(user)
  }

  #[instrument(name = "accounts::add_to_wishlist", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn add_to_wishlist(&self, caller: &Caller, book_id: Uuid) -> Result<Vec<Uuid>> {
    authorize(caller, Capability::ManageOwnAccount)?;
    if self.stores.catalog.get_book(book_id).await?.is_none() {
      return Err(BooknestError::not_found("Book", book_id));
    }
    let outcome = self
      .stores
      .users
      .add_to_wishlist(caller.user_id, book_id)
      .await?
      .ok_or_else(|| BooknestError::not_found("User", caller.user_id))?;
    if !outcome.changed {
      return Err(BooknestError::Conflict("Book already in wishlist.".to_string()));
    }
    info!(%book_id, "Added to wishlist.");
    Ok(outcome.wishlist)
  }

  #[instrument(name = "accounts::remove_from_wishlist", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn remove_from_wishlist(&self, caller: &Caller, book_id: Uuid) -> Result<Vec<Uuid>> {
    authorize(caller, Capability::ManageOwnAccount)?;
    let outcome = self
      .stores
      .users
      .remove_from_wishlist(caller.user_id, book_id)
      .await?
      .ok_or_else(|| BooknestError::not_found("User", caller.user_id))?;
    if outcome.changed {
      info!(%book_id, "Removed from wishlist.");
    }
    Ok(outcome.wishlist)
  }

  #[instrument(name = "accounts::list_by_role", skip(self), err(Display))]
  pub async fn list_by_role(&self, caller: &Caller, role: Role) -> Result<Vec<User>> {
    authorize(caller, Capability::ManageUsers)?;
    self.stores.users.users_by_role(role).await
  }

  /// Deletes a shopper or seller along with their cart. Orders are kept.
  #[instrument(name = "accounts::delete_user", skip(self), fields(admin_id = %caller.user_id), err(Display))]
  pub async fn delete_user(&self, caller: &Caller, user_id: Uuid) -> Result<()> {
    authorize(caller, Capability::ManageUsers)?;
    let user = self
      .stores
      .users
      .get_user(user_id)
      .await?
      .ok_or_else(|| BooknestError::not_found("User", user_id))?;
    if user.role == Role::Admin {
      return Err(BooknestError::Validation("Cannot delete admin user.".to_string()));
    }

    if !self.stores.users.delete_user(user_id).await? {
      return Err(BooknestError::not_found("User", user_id));
    }
    if let Err(e) = self.stores.carts.delete_cart(user_id).await {
      warn!(%user_id, error = %e, "Failed to remove cart of deleted user.");
    }
    info!(%user_id, "User deleted.");
    Ok(())
  }
}
