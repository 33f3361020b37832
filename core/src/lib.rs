// booknest/core/src/lib.rs

//! BookNest: the domain core of an online bookstore.
//!
//! - Catalog, account, cart, order and stats services over pluggable stores.
//! - An order placement engine built on a small compensating step pipeline.
//! - An explicit order status transition table.
//! - Role-gated access with argon2 passwords and HMAC-signed bearer tokens.
//!
//! Every operation takes an explicit [`Caller`]; nothing reads ambient
//! request state. [`Booknest`] wires the services to one set of [`Stores`].

pub mod access;
pub mod auth;
pub mod checkout;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod settings;
pub mod store;

pub use crate::access::{authorize, require_role, Caller, Capability};
pub use crate::auth::TokenIssuer;
pub use crate::checkout::{OrderPlacementEngine, Placement};
pub use crate::error::{BooknestError, Result};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult};
pub use crate::services::{AccountService, CartService, CatalogService, OrderService, StatsService};
pub use crate::settings::Settings;
pub use crate::store::{MemoryStore, Stores};

/// All services, sharing one set of stores and one token issuer.
#[derive(Clone)]
pub struct Booknest {
  pub stores: Stores,
  pub tokens: TokenIssuer,
  pub catalog: CatalogService,
  pub accounts: AccountService,
  pub carts: CartService,
  pub checkout: OrderPlacementEngine,
  pub orders: OrderService,
  pub stats: StatsService,
}

impl Booknest {
  pub fn new(stores: Stores, settings: &Settings) -> Result<Self> {
    let tokens = TokenIssuer::new(settings.token_secret.as_bytes(), settings.token_ttl)?;
    tracing::debug!(?settings, "Building BookNest services.");
    Ok(Self {
      catalog: CatalogService::new(stores.clone()),
      accounts: AccountService::new(stores.clone(), tokens.clone()),
      carts: CartService::new(stores.clone()),
      checkout: OrderPlacementEngine::new(stores.clone()),
      orders: OrderService::new(stores.clone(), settings.restock_on_cancel),
      stats: StatsService::new(stores.clone()),
      tokens,
      stores,
    })
  }

  /// Resolves the caller behind an optional bearer credential.
  pub fn resolve_caller(&self, credential: Option<&str>) -> Result<Caller> {
    self.tokens.resolve_caller(credential)
  }
}
