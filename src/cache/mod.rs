//! Response cache: durable request-key to payload store.
//!
//! - One serialized payload per fully-qualified request
//! - Cache-first lookups; the network is only touched on a miss
//! - Optional max age, with the expired entry served when the network fails

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{CacheStorage, CachedPayload, NoopStorage, SqliteStorage};
pub use traits::{CacheResult, CacheSource, Cacheable, QueryKey};
