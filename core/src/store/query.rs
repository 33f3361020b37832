// booknest/core/src/store/query.rs

use serde::{Deserialize, Serialize};

use crate::error::{BooknestError, Result};
use crate::models::Genre;

pub const DEFAULT_PAGE_LIMIT: u32 = 12;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A validated catalog scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
  /// Case-insensitive substring of title or author. Stored lowercased.
  pub search: Option<String>,
  pub genre: Option<Genre>,
  pub page: u32,
  pub limit: u32,
}

impl Default for BookQuery {
  fn default() -> Self {
    Self {
      search: None,
      genre: None,
      page: 1,
      limit: DEFAULT_PAGE_LIMIT,
    }
  }
}

impl BookQuery {
  pub fn new(search: Option<&str>, genre: Option<Genre>, page: Option<i64>, limit: Option<i64>) -> Result<Self> {
    let page = match page {
      None => 1,
      Some(p) if p >= 1 => u32::try_from(p).map_err(|_| BooknestError::Validation("Page is too large.".to_string()))?,
      Some(p) => return Err(BooknestError::Validation(format!("Invalid page {}.", p))),
    };
    let limit = match limit {
      None => DEFAULT_PAGE_LIMIT,
      Some(l) if (1..=i64::from(MAX_PAGE_LIMIT)).contains(&l) => l as u32,
      Some(l) => {
        return Err(BooknestError::Validation(format!(
          "Limit must be between 1 and {}, got {}.",
          MAX_PAGE_LIMIT, l
        )))
      }
    };
    let search = search
      .map(|s| s.trim().to_lowercase())
      .filter(|s| !s.is_empty());
    Ok(Self {
      search,
      genre,
      page,
      limit,
    })
  }

  /// Number of records to skip.
  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.limit)
  }

  pub fn matches_text(&self, title: &str, author: &str) -> bool {
    match &self.search {
      None => true,
      Some(needle) => title.to_lowercase().contains(needle) || author.to_lowercase().contains(needle),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub items: Vec<T>,
  pub page: u32,
  pub limit: u32,
  pub total: u64,
  pub total_pages: u64,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, query: &BookQuery, total: u64) -> Self {
    Self {
      items,
      page: query.page,
      limit: query.limit,
      total,
      total_pages: total.div_ceil(u64::from(query.limit)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_when_absent() {
    let q = BookQuery::new(None, None, None, None).unwrap();
    assert_eq!(q, BookQuery::default());
    assert_eq!(q.offset(), 0);
  }

  #[test]
  fn out_of_range_paging_is_rejected() {
    assert!(BookQuery::new(None, None, Some(0), None).is_err());
    assert!(BookQuery::new(None, None, None, Some(0)).is_err());
    assert!(BookQuery::new(None, None, None, Some(101)).is_err());
  }

  #[test]
  fn blank_search_is_ignored() {
    let q = BookQuery::new(Some("   "), None, Some(3), Some(10)).unwrap();
    assert_eq!(q.search, None);
    assert_eq!(q.offset(), 20);
  }

  #[test]
  fn total_pages_rounds_up() {
    let q = BookQuery::new(None, None, None, Some(10)).unwrap();
    let page: Page<u8> = Page::new(vec![], &q, 21);
    assert_eq!(page.total_pages, 3);
  }
}
