//! Cache-first gateway in front of the photo API.

use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheLayer, CacheSource};
use crate::config::Config;

use super::client::PhotoSource;
use super::error::FetchError;
use super::request::PhotoRequest;
use super::types::ImageBatch;

/// Fetch Gateway: consults the response cache by exact request key before
/// any network call, and writes every successful network batch back to it.
///
/// Retries are not its business; callers decide whether to ask again.
#[derive(Clone)]
pub struct FetchGateway {
  source: Arc<dyn PhotoSource>,
  cache: CacheLayer,
  per_page: u32,
  order_by: String,
}

impl FetchGateway {
  pub fn new(source: Arc<dyn PhotoSource>, cache: CacheLayer, config: &Config) -> Self {
    Self {
      source,
      cache,
      per_page: config.api.page_size,
      order_by: config.api.order_by.clone(),
    }
  }

  /// The request a `(term, page)` pair maps to
  pub fn request(&self, term: Option<&str>, page: u32) -> PhotoRequest {
    PhotoRequest {
      term: term.map(String::from),
      page,
      per_page: self.per_page,
      order_by: self.order_by.clone(),
    }
  }

  /// Fetch one page for `term` (`None` = browse listing).
  pub async fn fetch(&self, term: Option<&str>, page: u32) -> Result<ImageBatch, FetchError> {
    let request = self.request(term, page);

    let result = self
      .cache
      .fetch(&request, || self.source.fetch_page(&request))
      .await?;

    if result.source == CacheSource::Offline {
      debug!(request = %request.path_and_query(), "serving expired cache entry");
    }

    Ok(result.data)
  }
}
