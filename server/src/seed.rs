// booknest/server/src/seed.rs

//! Demo data for a fresh store: one account per role and a starter catalog.

use booknest::models::{BookCreate, Genre, Role};
use booknest::{Booknest, Caller, Result};
use tracing::{info, instrument, warn};

struct StarterBook {
  title: &'static str,
  author: &'static str,
  genre: Genre,
  description: &'static str,
  price: i64,
  stock: i64,
  rating: f64,
}

const STARTER_CATALOG: &[StarterBook] = &[
  StarterBook {
    title: "The Great Gatsby",
    author: "F. Scott Fitzgerald",
    genre: Genre::Fiction,
    description: "A classic American novel set in the Jazz Age.",
    price: 299,
    stock: 50,
    rating: 4.5,
  },
  StarterBook {
    title: "To Kill a Mockingbird",
    author: "Harper Lee",
    genre: Genre::Fiction,
    description: "Racial injustice and childhood innocence in the American South.",
    price: 349,
    stock: 45,
    rating: 4.8,
  },
  StarterBook {
    title: "1984",
    author: "George Orwell",
    genre: Genre::ScienceFiction,
    description: "A dystopian novel about totalitarianism and surveillance.",
    price: 279,
    stock: 60,
    rating: 4.7,
  },
  StarterBook {
    title: "Pride and Prejudice",
    author: "Jane Austen",
    genre: Genre::Romance,
    description: "Manners, marriage and morality in Georgian England.",
    price: 259,
    stock: 40,
    rating: 4.6,
  },
  StarterBook {
    title: "The Hobbit",
    author: "J.R.R. Tolkien",
    genre: Genre::Fantasy,
    description: "Bilbo Baggins sets out across Middle-earth.",
    price: 399,
    stock: 55,
    rating: 4.9,
  },
  StarterBook {
    title: "The Da Vinci Code",
    author: "Dan Brown",
    genre: Genre::Thriller,
    description: "A mystery involving art, history and conspiracy.",
    price: 359,
    stock: 48,
    rating: 4.4,
  },
  StarterBook {
    title: "Sapiens",
    author: "Yuval Noah Harari",
    genre: Genre::NonFiction,
    description: "A brief history of humankind.",
    price: 499,
    stock: 42,
    rating: 4.7,
  },
];

/// Seeds an empty store. Returns `false` without writing anything when any
/// account already exists.
#[instrument(name = "seed::seed_if_empty", skip(booknest), err(Display))]
pub async fn seed_if_empty(booknest: &Booknest) -> Result<bool> {
  let users = &booknest.stores.users;
  let existing = users.count_users_by_role(Role::Admin).await?
    + users.count_users_by_role(Role::Seller).await?
    + users.count_users_by_role(Role::Shopper).await?;
  if existing > 0 {
    info!(existing, "Store already has accounts, skipping seed.");
    return Ok(false);
  }

  warn!("Seeding demo accounts with well-known passwords. Do not enable SEED_DB in production.");
  let accounts = &booknest.accounts;
  accounts
    .create_account("Admin User", "admin@booknest.com", "admin123", Role::Admin)
    .await?;
  let seller = accounts
    .create_account("John Seller", "seller@booknest.com", "seller123", Role::Seller)
    .await?;
  accounts
    .create_account("Jane Doe", "user@booknest.com", "user123", Role::Shopper)
    .await?;

  let seller = Caller::new(seller.id, seller.role);
  for book in STARTER_CATALOG {
    let params = BookCreate {
      title: book.title.to_string(),
      author: book.author.to_string(),
      genre: book.genre,
      description: book.description.to_string(),
      price: book.price,
      stock: book.stock,
      rating: Some(book.rating),
      image_url: None,
    };
    booknest.catalog.create(&seller, params).await?;
  }

  info!(books = STARTER_CATALOG.len(), "Seed data inserted.");
  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;
  use booknest::{Settings, Stores};

  #[tokio::test]
  async fn seeds_each_role_and_the_catalog() {
    let booknest = Booknest::new(Stores::in_memory(), &Settings::new("seed-test-secret-seed-test-secret!")).unwrap();
    assert!(seed_if_empty(&booknest).await.unwrap());

    let users = &booknest.stores.users;
    for role in [Role::Admin, Role::Seller, Role::Shopper] {
      assert_eq!(users.count_users_by_role(role).await.unwrap(), 1);
    }
    assert_eq!(booknest.stores.catalog.count_books().await.unwrap(), STARTER_CATALOG.len() as u64);
  }
}
