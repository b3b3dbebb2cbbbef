

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ResolverError, Result};
use crate::llm::embeddings::{EmbeddingBackend, OovPolicy, ServiceFormat};
use crate::toolkit::search::SimilarityMeasure;
use crate::{
    DEFAULT_CACHE_SIZE, DEFAULT_MAX_VOCABULARY_WORDS, DEFAULT_SERVICE_DIMENSION,
    DEFAULT_SERVICE_URL, MAX_VOCABULARY_WORDS, SUPPORTED_LOOKUP_DIMENSIONS,
};

const ENV_PREFIX: &str = "SYMPTOM_RESOLVER";


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {

    pub hierarchy_path: PathBuf,
    pub body_parts_path: Option<PathBuf>,
    pub index_dir: PathBuf,


    pub embedding_backend: EmbeddingBackend,
    pub embedding_dimension: usize,
    pub vectors_path: Option<PathBuf>,
    pub concept_words_path: Option<PathBuf>,
    pub max_vocabulary_words: usize,
    pub oov_policy: OovPolicy,


    pub service_url: String,
    pub service_format: ServiceFormat,
    pub service_model: String,
    pub service_api_key: Option<String>,
    pub timeout_secs: u64,
    pub cache_size: usize,


    pub similarity_measure: SimilarityMeasure,
    pub min_similarity: f64,
    pub search_body_parts: bool,
    pub pruning: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            hierarchy_path: PathBuf::from("data/json/symptom_tree.json"),
            body_parts_path: None,
            index_dir: PathBuf::from("data/index"),

            embedding_backend: EmbeddingBackend::LookupTable,
            embedding_dimension: 100,
            vectors_path: None,
            concept_words_path: None,
            max_vocabulary_words: DEFAULT_MAX_VOCABULARY_WORDS,
            oov_policy: OovPolicy::Strict,

            service_url: DEFAULT_SERVICE_URL.to_string(),
            service_format: ServiceFormat::Ollama,
            service_model: "nomic-embed-text".to_string(),
            service_api_key: None,
            timeout_secs: 30,
            cache_size: DEFAULT_CACHE_SIZE,

            similarity_measure: SimilarityMeasure::Cosine,
            min_similarity: 0.0,
            search_body_parts: true,
            pruning: true,
        }
    }
}

impl ResolverConfig {

    /// Layers an optional config file and `SYMPTOM_RESOLVER_*` environment
    /// variables over the defaults, then validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Loading configuration file {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }


    /// Checks every constraint the engine relies on. Values are never clamped.
    pub fn validate(&self) -> Result<()> {
        match self.embedding_backend {
            EmbeddingBackend::LookupTable => {
                if !SUPPORTED_LOOKUP_DIMENSIONS.contains(&self.embedding_dimension) {
                    return Err(ResolverError::configuration(format!(
                        "lookup table dimension must be one of {:?}, got {}",
                        SUPPORTED_LOOKUP_DIMENSIONS, self.embedding_dimension
                    )));
                }
                if self.max_vocabulary_words > MAX_VOCABULARY_WORDS {
                    return Err(ResolverError::configuration(format!(
                        "the maximum number of vocabulary words is {MAX_VOCABULARY_WORDS}, got {}",
                        self.max_vocabulary_words
                    )));
                }
            }
            EmbeddingBackend::Service => {
                if self.embedding_dimension == 0 {
                    return Err(ResolverError::configuration(
                        "service embedding dimension must be positive",
                    ));
                }
                url::Url::parse(&self.service_url).map_err(|e| {
                    ResolverError::configuration(format!(
                        "invalid service url '{}': {e}",
                        self.service_url
                    ))
                })?;
            }
        }

        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(ResolverError::configuration(format!(
                "min_similarity must be a number >= 0 and <= 1, got {}",
                self.min_similarity
            )));
        }

        Ok(())
    }


    pub fn for_service(url: &str, model: &str) -> Self {
        Self {
            embedding_backend: EmbeddingBackend::Service,
            embedding_dimension: DEFAULT_SERVICE_DIMENSION,
            service_url: url.to_string(),
            service_model: model.to_string(),
            ..Self::default()
        }
    }


    pub fn index_file_name(&self) -> String {
        let backend: &'static str = self.embedding_backend.into();
        format!("concept_names_{backend}_{}d.csv", self.embedding_dimension)
    }

    pub fn index_path(&self) -> PathBuf {
        self.index_dir.join(self.index_file_name())
    }
}
