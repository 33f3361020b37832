// booknest/core/tests/stats_tests.rs
mod common;
use booknest::models::{OrderStatus, Role};
use common::*;

#[tokio::test]
async fn admin_revenue_skips_cancelled_orders() {
  let app = app();
  let seller = seller();
  let b = add_book(&app, &seller, "Counted", 400, 10).await;
  let kept = app.checkout.place_order(&shopper(), order_for(&[(b.id, 2)])).await.unwrap();
  let dropped = app.checkout.place_order(&shopper(), order_for(&[(b.id, 1)])).await.unwrap();
  app
    .orders
    .update_status(&admin(), dropped.id, OrderStatus::Cancelled)
    .await
    .unwrap();
  app
    .accounts
    .create_account("Buyer", "buyer@example.com", "secret123", Role::Shopper)
    .await
    .unwrap();

  let stats = app.stats.admin(&admin()).await.unwrap();
  assert_eq!(stats.total_orders, 2);
  assert_eq!(stats.total_books, 1);
  assert_eq!(stats.total_users, 1);
  assert_eq!(stats.total_sellers, 0);
  assert_eq!(stats.total_revenue, kept.total_amount);
}

#[tokio::test]
async fn seller_stats_count_only_own_lines() {
  let app = app();
  let me = seller();
  let rival = seller();
  let mine = add_book(&app, &me, "Mine", 300, 10).await;
  let theirs = add_book(&app, &rival, "Theirs", 999, 10).await;

  app
    .checkout
    .place_order(&shopper(), order_for(&[(mine.id, 2), (theirs.id, 1)]))
    .await
    .unwrap();
  app.checkout.place_order(&shopper(), order_for(&[(mine.id, 1)])).await.unwrap();

  let stats = app.stats.seller(&me).await.unwrap();
  assert_eq!(stats.total_books, 1);
  assert_eq!(stats.total_orders, 2);
  assert_eq!(stats.total_sales, 900);

  assert_eq!(app.stats.seller(&admin()).await.unwrap_err().kind(), "unauthorized");
}
