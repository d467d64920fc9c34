//! Serde-deserializable types matching Unsplash API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;
use std::collections::HashSet;

use super::types::{Image, ImageBatch};

/// Shown when a photo carries no description at all
pub const DESCRIPTION_PLACEHOLDER: &str = "Unsplash Image";

#[derive(Debug, Deserialize, Default)]
pub struct ApiUrls {
  #[serde(default)]
  pub small: String,
  #[serde(default)]
  pub regular: String,
  #[serde(default)]
  pub full: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiPhoto {
  pub id: String,
  #[serde(default)]
  pub urls: ApiUrls,
  pub alt_description: Option<String>,
  pub description: Option<String>,
  #[serde(default)]
  pub likes: u64,
}

/// `GET /search/photos` wraps its items
#[derive(Debug, Deserialize)]
pub struct ApiSearchResponse {
  #[serde(default)]
  pub results: Vec<ApiPhoto>,
}

/// Error body returned alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
  #[serde(default)]
  pub errors: Vec<String>,
}

impl ApiErrorResponse {
  pub fn first_message(&self) -> Option<&str> {
    self
      .errors
      .iter()
      .map(|e| e.trim())
      .find(|e| !e.is_empty())
  }
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiPhoto> for Image {
  fn from(photo: ApiPhoto) -> Self {
    let description = [photo.alt_description, photo.description]
      .into_iter()
      .flatten()
      .map(|d| d.trim().to_string())
      .find(|d| !d.is_empty())
      .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string());

    let full_url = if photo.urls.full.is_empty() {
      photo.urls.regular
    } else {
      photo.urls.full
    };

    Image {
      id: photo.id,
      thumb_url: photo.urls.small,
      full_url,
      description,
      likes: photo.likes,
    }
  }
}

/// Build a batch, keeping only the first photo for each id.
fn into_batch(photos: Vec<ApiPhoto>) -> ImageBatch {
  let mut seen = HashSet::new();
  let images = photos
    .into_iter()
    .filter(|p| seen.insert(p.id.clone()))
    .map(Image::from)
    .collect();
  ImageBatch::new(images)
}

impl From<ApiSearchResponse> for ImageBatch {
  fn from(resp: ApiSearchResponse) -> Self {
    into_batch(resp.results)
  }
}

impl From<Vec<ApiPhoto>> for ImageBatch {
  fn from(photos: Vec<ApiPhoto>) -> Self {
    into_batch(photos)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const PHOTO: &str = r#"{
    "id": "abc",
    "urls": { "small": "https://img/abc-small", "regular": "https://img/abc-regular", "full": "https://img/abc-full" },
    "alt_description": "a snowy peak",
    "description": "Mont Blanc",
    "likes": 42,
    "user": { "name": "ignored" }
  }"#;

  #[test]
  fn test_search_wrapper_normalizes() {
    let raw = format!(r#"{{ "total": 1, "total_pages": 1, "results": [{}] }}"#, PHOTO);
    let resp: ApiSearchResponse = serde_json::from_str(&raw).unwrap();
    let batch = ImageBatch::from(resp);

    assert_eq!(
      batch.images,
      vec![Image {
        id: "abc".to_string(),
        thumb_url: "https://img/abc-small".to_string(),
        full_url: "https://img/abc-full".to_string(),
        description: "a snowy peak".to_string(),
        likes: 42,
      }]
    );
  }

  #[test]
  fn test_bare_listing_normalizes_to_same_shape() {
    let raw = format!("[{}]", PHOTO);
    let photos: Vec<ApiPhoto> = serde_json::from_str(&raw).unwrap();
    let listing = ImageBatch::from(photos);

    let wrapped: ApiSearchResponse =
      serde_json::from_str(&format!(r#"{{ "results": [{}] }}"#, PHOTO)).unwrap();
    assert_eq!(listing, ImageBatch::from(wrapped));
  }

  #[test]
  fn test_description_fallbacks() {
    let raw = r#"[
      { "id": "1", "alt_description": null, "description": "from description" },
      { "id": "2", "alt_description": "  ", "description": null },
      { "id": "3" }
    ]"#;
    let photos: Vec<ApiPhoto> = serde_json::from_str(raw).unwrap();
    let batch = ImageBatch::from(photos);

    let descriptions: Vec<&str> = batch
      .images
      .iter()
      .map(|i| i.description.as_str())
      .collect();
    assert_eq!(
      descriptions,
      vec![
        "from description",
        DESCRIPTION_PLACEHOLDER,
        DESCRIPTION_PLACEHOLDER
      ]
    );
  }

  #[test]
  fn test_full_url_falls_back_to_regular() {
    let raw = r#"{ "id": "1", "urls": { "small": "s", "regular": "r" } }"#;
    let photo: ApiPhoto = serde_json::from_str(raw).unwrap();
    assert_eq!(Image::from(photo).full_url, "r");
  }

  #[test]
  fn test_duplicate_ids_within_batch_are_dropped() {
    let raw = r#"[
      { "id": "1", "likes": 1 },
      { "id": "2", "likes": 2 },
      { "id": "1", "likes": 3 }
    ]"#;
    let photos: Vec<ApiPhoto> = serde_json::from_str(raw).unwrap();
    let batch = ImageBatch::from(photos);

    let ids: Vec<(&str, u64)> = batch
      .images
      .iter()
      .map(|i| (i.id.as_str(), i.likes))
      .collect();
    assert_eq!(ids, vec![("1", 1), ("2", 2)]);
  }

  #[test]
  fn test_error_body_first_message() {
    let resp: ApiErrorResponse =
      serde_json::from_str(r#"{ "errors": ["", "OAuth error: The access token is invalid"] }"#)
        .unwrap();
    assert_eq!(
      resp.first_message(),
      Some("OAuth error: The access token is invalid")
    );
  }
}
