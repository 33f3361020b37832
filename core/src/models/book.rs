// booknest/core/src/models/book.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{BooknestError, Result};

pub const PLACEHOLDER_COVER_URL: &str = "https://via.placeholder.com/300x400?text=Book+Cover";

pub const MAX_RATING: f64 = 5.0;

/// The fixed set of genres a book can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
  Fiction,
  #[serde(rename = "Non-Fiction")]
  NonFiction,
  Mystery,
  Thriller,
  Romance,
  #[serde(rename = "Science Fiction")]
  ScienceFiction,
  Fantasy,
  Biography,
  History,
  #[serde(rename = "Self-Help")]
  SelfHelp,
  Business,
  Children,
  Horror,
  Poetry,
}

impl Genre {
  pub const ALL: [Genre; 14] = [
    Genre::Fiction,
    Genre::NonFiction,
    Genre::Mystery,
    Genre::Thriller,
    Genre::Romance,
    Genre::ScienceFiction,
    Genre::Fantasy,
    Genre::Biography,
    Genre::History,
    Genre::SelfHelp,
    Genre::Business,
    Genre::Children,
    Genre::Horror,
    Genre::Poetry,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Genre::Fiction => "Fiction",
      Genre::NonFiction => "Non-Fiction",
      Genre::Mystery => "Mystery",
      Genre::Thriller => "Thriller",
      Genre::Romance => "Romance",
      Genre::ScienceFiction => "Science Fiction",
      Genre::Fantasy => "Fantasy",
      Genre::Biography => "Biography",
      Genre::History => "History",
      Genre::SelfHelp => "Self-Help",
      Genre::Business => "Business",
      Genre::Children => "Children",
      Genre::Horror => "Horror",
      Genre::Poetry => "Poetry",
    }
  }
}

impl fmt::Display for Genre {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Genre {
  type Err = BooknestError;

  fn from_str(s: &str) -> Result<Self> {
    Genre::ALL
      .iter()
      .copied()
      .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| BooknestError::Validation(format!("Unknown genre '{}'.", s)))
  }
}

/// A catalog entry. `price` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
  pub id: Uuid,
  pub title: String,
  pub author: String,
  pub genre: Genre,
  pub description: String,
  pub price: i64,
  pub stock: u32,
  pub seller_id: Uuid,
  pub rating: f64,
  pub image_url: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Seller submission for a new book.
#[derive(Debug, Clone, Deserialize)]
pub struct BookCreate {
  pub title: String,
  pub author: String,
  pub genre: Genre,
  pub description: String,
  pub price: i64,
  pub stock: i64,
  #[serde(default)]
  pub rating: Option<f64>,
  #[serde(default)]
  pub image_url: Option<String>,
}

/// Partial update of a book. Only the fields that are `Some` are touched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookUpdate {
  pub title: Option<String>,
  pub author: Option<String>,
  pub genre: Option<Genre>,
  pub description: Option<String>,
  pub price: Option<i64>,
  pub stock: Option<i64>,
  pub rating: Option<f64>,
  pub image_url: Option<String>,
}

fn required_text(field: &str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(BooknestError::Validation(format!("Please provide {}.", field)));
  }
  Ok(trimmed.to_string())
}

fn checked_price(price: i64) -> Result<i64> {
  if price < 0 {
    return Err(BooknestError::Validation("Price cannot be negative.".to_string()));
  }
  Ok(price)
}

fn checked_stock(stock: i64) -> Result<u32> {
  u32::try_from(stock).map_err(|_| BooknestError::Validation(format!("Invalid stock quantity {}.", stock)))
}

fn checked_rating(rating: f64) -> Result<f64> {
  if !(0.0..=MAX_RATING).contains(&rating) {
    return Err(BooknestError::Validation(format!(
      "Rating must be between 0 and {}.",
      MAX_RATING
    )));
  }
  Ok(rating)
}

impl Book {
  /// Validates a submission and builds the stored record.
  pub fn from_create(id: Uuid, seller_id: Uuid, params: BookCreate, now: DateTime<Utc>) -> Result<Self> {
    Ok(Self {
      id,
      title: required_text("book title", &params.title)?,
      author: required_text("author name", &params.author)?,
      genre: params.genre,
      description: required_text("description", &params.description)?,
      price: checked_price(params.price)?,
      stock: checked_stock(params.stock)?,
      seller_id,
      rating: checked_rating(params.rating.unwrap_or(0.0))?,
      image_url: params
        .image_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| PLACEHOLDER_COVER_URL.to_string()),
      created_at: now,
      updated_at: now,
    })
  }

  /// Applies every present field of `update`. Validation happens before any
  /// field is written, so a rejected update leaves the book untouched.
  pub fn apply(&mut self, update: BookUpdate, now: DateTime<Utc>) -> Result<()> {
    let title = update.title.as_deref().map(|t| required_text("book title", t)).transpose()?;
    let author = update.author.as_deref().map(|a| required_text("author name", a)).transpose()?;
    let description = update
      .description
      .as_deref()
      .map(|d| required_text("description", d))
      .transpose()?;
    let price = update.price.map(checked_price).transpose()?;
    let stock = update.stock.map(checked_stock).transpose()?;
    let rating = update.rating.map(checked_rating).transpose()?;

    if let Some(title) = title {
      self.title = title;
    }
    if let Some(author) = author {
      self.author = author;
    }
    if let Some(genre) = update.genre {
      self.genre = genre;
    }
    if let Some(description) = description {
      self.description = description;
    }
    if let Some(price) = price {
      self.price = price;
    }
    if let Some(stock) = stock {
      self.stock = stock;
    }
    if let Some(rating) = rating {
      self.rating = rating;
    }
    if let Some(image_url) = update.image_url {
      self.image_url = image_url;
    }
    self.updated_at = now;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn submission() -> BookCreate {
    BookCreate {
      title: "  Dune ".to_string(),
      author: "Frank Herbert".to_string(),
      genre: Genre::ScienceFiction,
      description: "Spice.".to_string(),
      price: 499,
      stock: 4,
      rating: None,
      image_url: None,
    }
  }

  #[test]
  fn genre_parses_display_names_case_insensitively() {
    assert_eq!("science fiction".parse::<Genre>().unwrap(), Genre::ScienceFiction);
    assert_eq!("Self-Help".parse::<Genre>().unwrap(), Genre::SelfHelp);
    assert!("Cookbooks".parse::<Genre>().is_err());
  }

  #[test]
  fn genre_serializes_with_display_name() {
    let json = serde_json::to_string(&Genre::NonFiction).unwrap();
    assert_eq!(json, "\"Non-Fiction\"");
  }

  #[test]
  fn create_trims_and_defaults() {
    let book = Book::from_create(Uuid::new_v4(), Uuid::new_v4(), submission(), Utc::now()).unwrap();
    assert_eq!(book.title, "Dune");
    assert_eq!(book.rating, 0.0);
    assert_eq!(book.image_url, PLACEHOLDER_COVER_URL);
  }

  #[test]
  fn create_rejects_negative_stock_and_price() {
    let mut params = submission();
    params.stock = -1;
    assert!(Book::from_create(Uuid::new_v4(), Uuid::new_v4(), params, Utc::now()).is_err());

    let mut params = submission();
    params.price = -10;
    assert!(Book::from_create(Uuid::new_v4(), Uuid::new_v4(), params, Utc::now()).is_err());
  }

  #[test]
  fn rejected_update_leaves_book_untouched() {
    let mut book = Book::from_create(Uuid::new_v4(), Uuid::new_v4(), submission(), Utc::now()).unwrap();
    let before = book.clone();
    let update = BookUpdate {
      title: Some("Dune Messiah".to_string()),
      rating: Some(7.5),
      ..Default::default()
    };
    assert!(book.apply(update, Utc::now()).is_err());
    assert_eq!(book, before);
  }

  #[test]
  fn update_touches_only_present_fields() {
    let mut book = Book::from_create(Uuid::new_v4(), Uuid::new_v4(), submission(), Utc::now()).unwrap();
    let update = BookUpdate {
      price: Some(650),
      ..Default::default()
    };
    book.apply(update, Utc::now()).unwrap();
    assert_eq!(book.price, 650);
    assert_eq!(book.title, "Dune");
    assert_eq!(book.stock, 4);
  }
}
