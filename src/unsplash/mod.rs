//! Unsplash photo API: request model, wire types, HTTP client and the
//! cache-first fetch gateway.

pub mod api_types;
pub mod client;
pub mod error;
pub mod gateway;
pub mod request;
pub mod types;

pub use client::{PhotoSource, UnsplashClient};
pub use error::FetchError;
pub use gateway::FetchGateway;
pub use request::{Endpoint, PhotoRequest};
pub use types::{Image, ImageBatch};
