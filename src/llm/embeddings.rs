

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;
use tracing::warn;


/// Fixed-width embedding. Absence of a vector ("no representation") is
/// expressed as `None` at every call site, never as a zero vector.
pub type EmbeddingVector = Vec<f32>;


#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty text")]
    EmptyText,

    #[error("Dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Malformed vector table at line {line}: {reason}")]
    MalformedTable { line: usize, reason: String },

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmbeddingBackend {

    LookupTable,

    Service,
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceFormat {
    Ollama,
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
}


/// How a multi-word text is vectorized when some of its words are unknown to
/// a lookup table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OovPolicy {
    /// Any out-of-vocabulary word yields no vector for the whole text.
    #[default]
    Strict,
    /// Mean of the in-vocabulary words; no vector only when none are known.
    MeanOfKnown,
}


/// The contract every embedding backend fulfils. Implementations must be
/// deterministic for a fixed backend and version.
pub trait EmbeddingProvider: Send + Sync {

    fn try_embed(&self, text: &str) -> Result<Option<EmbeddingVector>, EmbeddingError>;


    fn dimension(&self) -> usize;


    fn backend(&self) -> EmbeddingBackend;


    /// Failures degrade to `None` so a single bad item never aborts a batch.
    fn embed(&self, text: &str) -> Option<EmbeddingVector> {
        match self.try_embed(text) {
            Ok(vector) => vector,
            Err(EmbeddingError::EmptyText) => None,
            Err(e) => {
                warn!(
                    "Embedding failed for '{}': {}",
                    crate::utils::safe_truncate(text, 50),
                    e
                );
                None
            }
        }
    }


    /// Vectorizes an already-normalized concept name.
    fn embed_concept_name(&self, concept_name: &str) -> Option<EmbeddingVector> {
        self.embed(concept_name)
    }
}


/// Component-wise mean of `vectors`; `None` for an empty input.
pub fn mean_vector<'a, I>(vectors: I, dimension: usize) -> Option<EmbeddingVector>
where
    I: IntoIterator<Item = &'a EmbeddingVector>,
{
    let mut sum = vec![0.0f32; dimension];
    let mut count = 0usize;

    for vector in vectors {
        for (acc, value) in sum.iter_mut().zip(vector.iter()) {
            *acc += value;
        }
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let n = count as f32;
    Some(sum.into_iter().map(|v| v / n).collect())
}
