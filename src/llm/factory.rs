

use std::sync::Arc;

use tracing::info;

use super::embeddings::{EmbeddingBackend, EmbeddingError, EmbeddingProvider};
use super::providers::{LookupTableProvider, ServiceProvider};
use crate::core::config::ResolverConfig;
use crate::core::error::Result;


pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {

    /// Builds the backend named by `config` after validating it.
    pub fn from_config(config: &ResolverConfig) -> Result<Arc<dyn EmbeddingProvider>> {
        config.validate()?;

        let provider: Arc<dyn EmbeddingProvider> = match config.embedding_backend {
            EmbeddingBackend::LookupTable => {
                let path = config.vectors_path.as_deref().ok_or_else(|| {
                    EmbeddingError::MissingConfiguration(
                        "vectors_path is required for the lookup_table backend".to_string(),
                    )
                })?;
                let mut provider = LookupTableProvider::from_file(
                    path,
                    config.embedding_dimension,
                    config.max_vocabulary_words,
                    config.oov_policy,
                )?;
                if let Some(concept_words) = config.concept_words_path.as_deref() {
                    provider = provider.with_concept_words_file(concept_words)?;
                }
                Arc::new(provider)
            }
            EmbeddingBackend::Service => Arc::new(ServiceProvider::new(
                config.service_format,
                config.service_url.clone(),
                config.service_model.clone(),
                config.service_api_key.clone(),
                config.embedding_dimension,
                config.timeout_secs,
                config.cache_size,
            )?),
        };

        info!(
            "Embedding provider ready: backend={}, dim={}",
            provider.backend(),
            provider.dimension()
        );
        Ok(provider)
    }
}
