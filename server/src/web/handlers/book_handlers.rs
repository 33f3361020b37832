// booknest/server/src/web/handlers/book_handlers.rs

use actix_web::{web, HttpResponse};
use booknest::models::{BookCreate, BookUpdate, Genre};
use booknest::store::BookQuery;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedCaller;

#[derive(Deserialize, Debug)]
pub struct ListBooksQuery {
  pub search: Option<String>,
  pub genre: Option<String>,
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

impl ListBooksQuery {
  fn to_query(&self) -> Result<BookQuery, AppError> {
    // An empty genre (e.g. `?genre=`) means no filter.
    let genre = self
      .genre
      .as_deref()
      .filter(|g| !g.trim().is_empty())
      .map(str::parse::<Genre>)
      .transpose()?;
    Ok(BookQuery::new(self.search.as_deref(), genre, self.page, self.limit)?)
  }
}

#[instrument(name = "handler::list_books", skip(app_state))]
pub async fn list_books_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListBooksQuery>,
) -> Result<HttpResponse, AppError> {
  let page = app_state.booknest.catalog.list(&query.to_query()?).await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::get_book", skip(app_state, path), fields(book_id = %path.as_ref()))]
pub async fn get_book_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let book = app_state.booknest.catalog.get(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(book))
}

#[instrument(name = "handler::create_book", skip(app_state, auth, payload), fields(user_id = %auth.0.user_id))]
pub async fn create_book_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  payload: web::Json<BookCreate>,
) -> Result<HttpResponse, AppError> {
  let book = app_state.booknest.catalog.create(&auth.0, payload.into_inner()).await?;
  info!(book_id = %book.id, "Book listed.");
  Ok(HttpResponse::Created().json(book))
}

#[instrument(
  name = "handler::update_book",
  skip(app_state, auth, path, payload),
  fields(user_id = %auth.0.user_id, book_id = %path.as_ref())
)]
pub async fn update_book_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<Uuid>,
  payload: web::Json<BookUpdate>,
) -> Result<HttpResponse, AppError> {
  let book = app_state
    .booknest
    .catalog
    .update(&auth.0, path.into_inner(), payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(book))
}

#[instrument(
  name = "handler::delete_book",
  skip(app_state, auth, path),
  fields(user_id = %auth.0.user_id, book_id = %path.as_ref())
)]
pub async fn delete_book_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.booknest.catalog.delete(&auth.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Book removed." })))
}

#[instrument(name = "handler::my_books", skip(app_state, auth), fields(user_id = %auth.0.user_id))]
pub async fn seller_books_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
) -> Result<HttpResponse, AppError> {
  let books = app_state.booknest.catalog.seller_books(&auth.0).await?;
  Ok(HttpResponse::Ok().json(books))
}
