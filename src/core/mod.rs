

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, EmbeddingCache};
pub use config::ResolverConfig;
pub use error::{ResolverError, Result};
