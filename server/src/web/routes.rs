// booknest/server/src/web/routes.rs

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use booknest::BooknestError;

use crate::errors::AppError;
use crate::web::handlers::{admin_handlers, auth_handlers, book_handlers, order_handlers, user_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn bad_request(detail: String) -> actix_web::Error {
  AppError::from(BooknestError::Validation(detail)).into()
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  bad_request(format!("Invalid JSON body: {}", err))
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  bad_request(format!("Invalid query string: {}", err))
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
  bad_request(format!("Invalid path parameter: {}", err))
}

/// Malformed bodies, queries and ids answer with the same error envelope as
/// domain validation failures.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error))
    .app_data(web::QueryConfig::default().error_handler(query_error))
    .app_data(web::PathConfig::default().error_handler(path_error));
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/me", web::get().to(auth_handlers::me_handler)),
      )
      .service(
        web::scope("/books")
          .route("", web::get().to(book_handlers::list_books_handler))
          .route("", web::post().to(book_handlers::create_book_handler))
          .route("/seller/my-books", web::get().to(book_handlers::seller_books_handler))
          .route("/{book_id}", web::get().to(book_handlers::get_book_handler))
          .route("/{book_id}", web::put().to(book_handlers::update_book_handler))
          .route("/{book_id}", web::delete().to(book_handlers::delete_book_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::place_order_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          // Before `/{order_id}` so the literal segment wins.
          .route("/my-orders", web::get().to(order_handlers::my_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/status", web::put().to(order_handlers::update_order_status_handler)),
      )
      .service(
        web::scope("/users")
          .route("/profile", web::get().to(user_handlers::get_profile_handler))
          .route("/profile", web::put().to(user_handlers::update_profile_handler))
          .route("/wishlist/{book_id}", web::post().to(user_handlers::add_to_wishlist_handler))
          .route("/wishlist/{book_id}", web::delete().to(user_handlers::remove_from_wishlist_handler))
          .route("/cart", web::get().to(user_handlers::get_cart_handler))
          .route("/cart", web::post().to(user_handlers::add_to_cart_handler))
          .route("/cart", web::delete().to(user_handlers::clear_cart_handler))
          .route("/cart/{book_id}", web::put().to(user_handlers::update_cart_item_handler))
          .route("/cart/{book_id}", web::delete().to(user_handlers::remove_cart_item_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/users", web::get().to(admin_handlers::list_users_handler))
          .route("/users/{user_id}", web::delete().to(admin_handlers::delete_user_handler))
          .route("/sellers", web::get().to(admin_handlers::list_sellers_handler))
          .route("/stats", web::get().to(admin_handlers::admin_stats_handler))
          .route("/seller/stats", web::get().to(admin_handlers::seller_stats_handler)),
      ),
  );
}
