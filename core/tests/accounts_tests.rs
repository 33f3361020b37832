// booknest/core/tests/accounts_tests.rs
mod common;
use booknest::models::{ProfileUpdate, Role};
use booknest::services::{LoginRequest, RegisterRequest};
use booknest::store::UserStore;
use booknest::Caller;
use common::*;
use std::collections::HashSet;
use uuid::Uuid;

fn registration(email: &str, role: Option<Role>) -> RegisterRequest {
  RegisterRequest {
    name: "Ada Reader".to_string(),
    email: email.to_string(),
    password: "booklover".to_string(),
    role,
  }
}

#[tokio::test]
async fn register_then_login_issues_working_tokens() {
  let app = app();
  let session = app
    .accounts
    .register(registration("  Ada@Example.COM ", None))
    .await
    .unwrap();
  assert_eq!(session.user.email, "ada@example.com");
  assert_eq!(session.user.role, Role::Shopper);
  assert_ne!(session.user.password_hash, "booklover");

  let caller = app.resolve_caller(Some(&session.token)).unwrap();
  assert_eq!(caller, Caller::new(session.user.id, Role::Shopper));

  let login = app
    .accounts
    .login(LoginRequest {
      email: "ADA@example.com".to_string(),
      password: "booklover".to_string(),
    })
    .await
    .unwrap();
  assert_eq!(login.user.id, session.user.id);
}

#[tokio::test]
async fn registration_rules() {
  let app = app();
  app.accounts.register(registration("dup@example.com", None)).await.unwrap();

  let err = app.accounts.register(registration("DUP@example.com", None)).await.unwrap_err();
  assert_eq!(err.kind(), "conflict");

  let err = app
    .accounts
    .register(registration("boss@example.com", Some(Role::Admin)))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), "validation_error");

  let mut short = registration("short@example.com", None);
  short.password = "12345".to_string();
  assert_eq!(app.accounts.register(short).await.unwrap_err().kind(), "validation_error");

  let seller = app
    .accounts
    .register(registration("seller@example.com", Some(Role::Seller)))
    .await
    .unwrap();
  assert_eq!(seller.user.role, Role::Seller);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
  let app = app();
  app.accounts.register(registration("who@example.com", None)).await.unwrap();

  let wrong = app
    .accounts
    .login(LoginRequest {
      email: "who@example.com".to_string(),
      password: "not-it".to_string(),
    })
    .await
    .unwrap_err();
  let unknown = app
    .accounts
    .login(LoginRequest {
      email: "nobody@example.com".to_string(),
      password: "booklover".to_string(),
    })
    .await
    .unwrap_err();
  assert_eq!(wrong.kind(), "unauthenticated");
  assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn profile_update_touches_only_given_fields() {
  let app = app();
  let session = app.accounts.register(registration("pat@example.com", None)).await.unwrap();
  let caller = app.resolve_caller(Some(&session.token)).unwrap();

  let updated = app
    .accounts
    .update_profile(
      &caller,
      ProfileUpdate {
        name: Some("Pat Page".to_string()),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.name, "Pat Page");
  assert_eq!(updated.email, "pat@example.com");

  app
    .accounts
    .update_profile(
      &caller,
      ProfileUpdate {
        password: Some("newpassword".to_string()),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  let relogin = app
    .accounts
    .login(LoginRequest {
      email: "pat@example.com".to_string(),
      password: "newpassword".to_string(),
    })
    .await;
  assert!(relogin.is_ok());
}

#[tokio::test]
async fn email_change_cannot_take_another_account() {
  let app = app();
  app.accounts.register(registration("first@example.com", None)).await.unwrap();
  let second = app.accounts.register(registration("second@example.com", None)).await.unwrap();
  let caller = Caller::new(second.user.id, second.user.role);

  let err = app
    .accounts
    .update_profile(
      &caller,
      ProfileUpdate {
        email: Some("First@Example.com".to_string()),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();
  assert_eq!(err.kind(), "conflict");
}

#[tokio::test]
async fn wishlist_has_no_duplicates() {
  let app = app();
  let session = app.accounts.register(registration("wish@example.com", None)).await.unwrap();
  let caller = Caller::new(session.user.id, session.user.role);
  let b = add_book(&app, &seller(), "Wanted", 100, 1).await;

  assert_eq!(app.accounts.add_to_wishlist(&caller, b.id).await.unwrap(), vec![b.id]);
  let err = app.accounts.add_to_wishlist(&caller, b.id).await.unwrap_err();
  assert_eq!(err.kind(), "conflict");
  let err = app.accounts.add_to_wishlist(&caller, Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), "not_found");

  assert!(app.accounts.remove_from_wishlist(&caller, b.id).await.unwrap().is_empty());
  assert!(app.accounts.remove_from_wishlist(&caller, b.id).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_wishlist_adds_all_land() {
  let app = app();
  let session = app.accounts.register(registration("many@example.com", None)).await.unwrap();
  let caller = Caller::new(session.user.id, session.user.role);
  let seller = seller();
  let mut books = Vec::new();
  for i in 0..12 {
    books.push(add_book(&app, &seller, &format!("Wish {}", i), 100, 1).await.id);
  }

  let mut tasks = Vec::new();
  for book_id in books.clone() {
    let app = app.clone();
    tasks.push(tokio::spawn(async move { app.accounts.add_to_wishlist(&caller, book_id).await }));
  }
  for task in tasks {
    task.await.unwrap().unwrap();
  }

  let wishlist: HashSet<Uuid> = app.accounts.profile(&caller).await.unwrap().wishlist.into_iter().collect();
  assert_eq!(wishlist, books.into_iter().collect::<HashSet<_>>());
}

#[tokio::test]
async fn profile_write_from_stale_read_keeps_wishlist() {
  let app = app();
  let session = app.accounts.register(registration("stale@example.com", None)).await.unwrap();
  let caller = Caller::new(session.user.id, session.user.role);
  let b = add_book(&app, &seller(), "Added meanwhile", 100, 1).await;

  let mut stale = app.accounts.profile(&caller).await.unwrap();
  app.accounts.add_to_wishlist(&caller, b.id).await.unwrap();
  stale.name = "Ada Renamed".to_string();
  assert!(app.stores.users.update_user(&stale).await.unwrap());

  let user = app.accounts.profile(&caller).await.unwrap();
  assert_eq!(user.name, "Ada Renamed");
  assert_eq!(user.wishlist, vec![b.id]);
}

#[tokio::test]
async fn admins_cannot_be_deleted() {
  let app = app();
  let root = app
    .accounts
    .create_account("Root", "root@example.com", "rootroot", Role::Admin)
    .await
    .unwrap();
  let admin = Caller::new(root.id, Role::Admin);

  let err = app.accounts.delete_user(&admin, root.id).await.unwrap_err();
  assert_eq!(err.kind(), "validation_error");

  let victim = app.accounts.register(registration("bye@example.com", None)).await.unwrap();
  app.accounts.delete_user(&admin, victim.user.id).await.unwrap();
  let err = app.accounts.delete_user(&admin, victim.user.id).await.unwrap_err();
  assert_eq!(err.kind(), "not_found");

  let err = app.accounts.delete_user(&shopper(), root.id).await.unwrap_err();
  assert_eq!(err.kind(), "unauthorized");
}

#[tokio::test]
async fn admin_lists_users_by_role() {
  let app = app();
  app.accounts.register(registration("s1@example.com", None)).await.unwrap();
  app.accounts.register(registration("s2@example.com", None)).await.unwrap();
  app
    .accounts
    .register(registration("v1@example.com", Some(Role::Seller)))
    .await
    .unwrap();

  let admin = admin();
  assert_eq!(app.accounts.list_by_role(&admin, Role::Shopper).await.unwrap().len(), 2);
  assert_eq!(app.accounts.list_by_role(&admin, Role::Seller).await.unwrap().len(), 1);
}
