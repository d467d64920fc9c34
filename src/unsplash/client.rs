use futures::future::BoxFuture;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, warn};

use crate::config::Config;
use crate::unsplash::api_types::{ApiErrorResponse, ApiPhoto, ApiSearchResponse};
use crate::unsplash::error::FetchError;
use crate::unsplash::request::{Endpoint, PhotoRequest};
use crate::unsplash::types::ImageBatch;

/// Network side of the gateway.
///
/// The only thing in the crate allowed to cross the network boundary.
/// Implementations never retry and always return a classified outcome.
pub trait PhotoSource: Send + Sync {
  fn fetch_page(
    &self,
    request: &PhotoRequest,
  ) -> BoxFuture<'static, Result<ImageBatch, FetchError>>;
}

/// Unsplash API client wrapper
#[derive(Clone)]
pub struct UnsplashClient {
  http: Client,
  base_url: String,
  access_key: String,
}

impl UnsplashClient {
  pub fn new(config: &Config, access_key: String) -> color_eyre::Result<Self> {
    let http = Client::builder()
      .user_agent(concat!("shutter/", env!("CARGO_PKG_VERSION")))
      .timeout(config.request_timeout())
      .build()
      .map_err(|e| color_eyre::eyre::eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: config.api.url.clone(),
      access_key,
    })
  }

  /// Fetch and normalize one page of photos
  pub async fn get_photos(&self, request: &PhotoRequest) -> Result<ImageBatch, FetchError> {
    let url = request
      .url(&self.base_url)
      .map_err(|e| FetchError::other(format!("Invalid API URL {}: {}", self.base_url, e)))?;

    debug!(%url, "requesting photos");

    let response = self
      .http
      .get(url)
      .header(header::AUTHORIZATION, format!("Client-ID {}", self.access_key))
      .header("Accept-Version", "v1")
      .send()
      .await
      .map_err(|e| FetchError::other(e.to_string()))?;

    let status = response.status();
    let body = response
      .bytes()
      .await
      .map_err(|e| FetchError::other(e.to_string()))?;

    if !status.is_success() {
      let err = classify_failure(status, &body);
      warn!(status = status.as_u16(), error = %err, "photo request failed");
      return Err(err);
    }

    // Search wraps its items, the listing is a bare array
    let parse_err =
      |e: serde_json::Error| FetchError::other(format!("Failed to parse photos: {}", e));
    let batch = match request.endpoint() {
      Endpoint::Search => {
        let resp: ApiSearchResponse = serde_json::from_slice(&body).map_err(parse_err)?;
        ImageBatch::from(resp)
      }
      Endpoint::Listing => {
        let photos: Vec<ApiPhoto> = serde_json::from_slice(&body).map_err(parse_err)?;
        ImageBatch::from(photos)
      }
    };

    Ok(batch)
  }
}

impl PhotoSource for UnsplashClient {
  fn fetch_page(
    &self,
    request: &PhotoRequest,
  ) -> BoxFuture<'static, Result<ImageBatch, FetchError>> {
    let client = self.clone();
    let request = request.clone();
    Box::pin(async move { client.get_photos(&request).await })
  }
}

/// Map a non-2xx response to a domain error
fn classify_failure(status: StatusCode, body: &[u8]) -> FetchError {
  if status == StatusCode::FORBIDDEN {
    return FetchError::QuotaExhausted;
  }

  let upstream = serde_json::from_slice::<ApiErrorResponse>(body)
    .ok()
    .and_then(|resp| resp.first_message().map(String::from));

  FetchError::Other(upstream.unwrap_or_else(|| {
    format!("Request failed with status code {}", status.as_u16())
  }))
}
