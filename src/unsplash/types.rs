use serde::{Deserialize, Serialize};

use crate::cache::Cacheable;

/// A single photo as the rest of the app sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
  pub id: String,
  pub thumb_url: String,
  pub full_url: String,
  pub description: String,
  pub likes: u64,
}

/// Normalized result of one page request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBatch {
  pub images: Vec<Image>,
}

impl ImageBatch {
  pub fn new(images: Vec<Image>) -> Self {
    Self { images }
  }

  pub fn len(&self) -> usize {
    self.images.len()
  }

  pub fn is_empty(&self) -> bool {
    self.images.is_empty()
  }
}

impl Cacheable for ImageBatch {
  fn entity_type() -> &'static str {
    "image_batch"
  }
}
