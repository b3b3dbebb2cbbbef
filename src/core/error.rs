

use thiserror::Error;

use crate::llm::embeddings::EmbeddingError;
use crate::toolkit::body_parts::BodyPartError;
use crate::toolkit::ontology::HierarchyError;
use crate::toolkit::search::IndexError;


#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("Concept index error: {0}")]
    Index(#[from] IndexError),

    #[error("Body part table error: {0}")]
    BodyPart(#[from] BodyPartError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolverError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}


pub type Result<T> = std::result::Result<T, ResolverError>;
