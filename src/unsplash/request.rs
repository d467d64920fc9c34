//! Logical page requests and their cache identity.

use sha2::{Digest, Sha256};
use url::{form_urlencoded, Url};

use crate::cache::QueryKey;

/// Which upstream endpoint a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
  /// Keyword search, `{ "results": [...] }`
  Search,
  /// Unfiltered listing, bare array
  Listing,
}

impl Endpoint {
  pub fn path(self) -> &'static str {
    match self {
      Endpoint::Search => "/search/photos",
      Endpoint::Listing => "/photos",
    }
  }
}

/// One page of photos, optionally filtered by a search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRequest {
  pub term: Option<String>,
  pub page: u32,
  pub per_page: u32,
  pub order_by: String,
}

impl PhotoRequest {
  pub fn endpoint(&self) -> Endpoint {
    if self.term.is_some() {
      Endpoint::Search
    } else {
      Endpoint::Listing
    }
  }

  fn query_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::with_capacity(4);
    if let Some(term) = &self.term {
      pairs.push(("query", term.clone()));
    }
    pairs.push(("page", self.page.to_string()));
    pairs.push(("per_page", self.per_page.to_string()));
    pairs.push(("order_by", self.order_by.clone()));
    pairs
  }

  /// Endpoint path plus encoded query string, e.g. `/photos?page=2&per_page=20&order_by=popular`
  pub fn path_and_query(&self) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
      .extend_pairs(self.query_pairs())
      .finish();
    format!("{}?{}", self.endpoint().path(), query)
  }

  /// Absolute URL against the configured API base
  pub fn url(&self, base: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!(
      "{}{}",
      base.trim_end_matches('/'),
      self.endpoint().path()
    ))?;
    url.query_pairs_mut().extend_pairs(self.query_pairs());
    Ok(url)
  }
}

impl QueryKey for PhotoRequest {
  fn cache_hash(&self) -> String {
    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(self.path_and_query().as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    self.path_and_query()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(term: Option<&str>, page: u32) -> PhotoRequest {
    PhotoRequest {
      term: term.map(String::from),
      page,
      per_page: 20,
      order_by: "popular".to_string(),
    }
  }

  #[test]
  fn test_endpoint_selection() {
    assert_eq!(request(None, 1).endpoint(), Endpoint::Listing);
    assert_eq!(request(Some("cat"), 1).endpoint(), Endpoint::Search);
  }

  #[test]
  fn test_path_and_query() {
    assert_eq!(
      request(None, 2).path_and_query(),
      "/photos?page=2&per_page=20&order_by=popular"
    );
    assert_eq!(
      request(Some("red fox"), 1).path_and_query(),
      "/search/photos?query=red+fox&page=1&per_page=20&order_by=popular"
    );
  }

  #[test]
  fn test_url_joins_base() {
    let url = request(Some("cat"), 3)
      .url("https://api.unsplash.com/")
      .unwrap();
    assert_eq!(
      url.as_str(),
      "https://api.unsplash.com/search/photos?query=cat&page=3&per_page=20&order_by=popular"
    );
  }

  #[test]
  fn test_cache_hash_identity() {
    assert_eq!(
      request(Some("cat"), 1).cache_hash(),
      request(Some("cat"), 1).cache_hash()
    );
    assert_ne!(
      request(Some("cat"), 1).cache_hash(),
      request(Some("cat"), 2).cache_hash()
    );
    assert_ne!(
      request(Some("cat"), 1).cache_hash(),
      request(Some("Cat"), 1).cache_hash()
    );
    assert_ne!(
      request(None, 1).cache_hash(),
      request(Some("cat"), 1).cache_hash()
    );
    assert_eq!(request(None, 1).cache_hash().len(), 64);
  }
}
