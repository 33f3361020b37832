// booknest/server/src/state.rs
use crate::config::AppConfig;
use booknest::Booknest;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub booknest: Booknest,
  pub config: Arc<AppConfig>, // Share loaded config
}
