// booknest/server/src/lib.rs

//! HTTP server for BookNest: actix-web handlers over the `booknest` core,
//! backed by Postgres or the in-memory store.

pub mod config;
pub mod db;
pub mod errors;
pub mod seed;
pub mod state;
pub mod web;

use actix_web::web as actix_data;

use crate::state::AppState;

/// Registers shared state, extractor error handling and every route.
pub fn configure_app(app_state: AppState) -> impl FnOnce(&mut actix_data::ServiceConfig) {
  move |cfg| {
    cfg.app_data(actix_data::Data::new(app_state));
    web::configure_extractors(cfg);
    web::configure_app_routes(cfg);
  }
}
