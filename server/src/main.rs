// booknest/server/src/main.rs

use actix_web::{App, HttpServer};
use booknest::{Booknest, Stores};
use booknest_server::config::AppConfig;
use booknest_server::db::PgStore;
use booknest_server::errors::AppError;
use booknest_server::seed::seed_if_empty;
use booknest_server::state::AppState;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

async fn build_stores(config: &AppConfig) -> Result<Stores, AppError> {
  let Some(database_url) = config.database_url.as_deref() else {
    tracing::warn!("DATABASE_URL is not set, using the in-memory store. Data is lost on exit.");
    return Ok(Stores::in_memory());
  };

  let pool = PgPool::connect(database_url).await?;
  tracing::info!("Successfully connected to the database.");
  let store = PgStore::new(pool);
  store.migrate().await?;
  tracing::info!("Database migrations applied.");
  Ok(Stores::from_backend(Arc::new(store)))
}

async fn build_state() -> Result<AppState, AppError> {
  let config = Arc::new(AppConfig::from_env()?);
  tracing::debug!(?config, "Loaded configuration.");

  let stores = build_stores(&config).await?;
  let booknest = Booknest::new(stores, &config.settings())?;

  if config.seed_db {
    seed_if_empty(&booknest).await?;
  }

  Ok(AppState { booknest, config })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting BookNest server...");

  let app_state = match build_state().await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialize the application.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let server_address = format!("{}:{}", app_state.config.server_host, app_state.config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .configure(booknest_server::configure_app(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
  })
  .bind(&server_address)?
  .run()
  .await
}
