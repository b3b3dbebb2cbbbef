

pub mod core;
pub mod llm;
pub mod toolkit;
pub mod utils;

pub use utils::{normalize_text, safe_truncate};


pub use crate::core::config::ResolverConfig;
pub use crate::core::error::{ResolverError, Result};
pub use llm::embeddings::{EmbeddingProvider, EmbeddingVector};
pub use toolkit::search::{ConceptResolver, MatchResult};


pub const DEFAULT_SERVICE_URL: &str = "http://localhost:11434";


pub const DEFAULT_SERVICE_DIMENSION: usize = 768;


pub const DEFAULT_CACHE_SIZE: usize = 1000;


pub const DEFAULT_MAX_VOCABULARY_WORDS: usize = 100_000;


pub const MAX_VOCABULARY_WORDS: usize = 300_000;


pub const SUPPORTED_LOOKUP_DIMENSIONS: [usize; 4] = [50, 100, 200, 300];

/// Word marking the generic root concept; ancestors named with it are never
/// specialization targets.
pub const ROOT_MARKER_WORD: &str = "symptoms";

/// Claim used for real concepts missing from the hierarchy.
pub const CLAIM_PLACEHOLDER: &str = "CUIplaceholder";
