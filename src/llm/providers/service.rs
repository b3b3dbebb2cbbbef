

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::cache::{CacheStats, EmbeddingCache};
use crate::llm::embeddings::{
    EmbeddingBackend, EmbeddingError, EmbeddingProvider, EmbeddingVector, ServiceFormat,
};


#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}


/// Contextual embeddings from a remote service. Whole phrases are embedded in
/// one request; the call blocks the caller until the service answers.
pub struct ServiceProvider {
    format: ServiceFormat,
    base_url: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
    client: Client,
    cache: EmbeddingCache,
}

impl ServiceProvider {

    pub fn new(
        format: ServiceFormat,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        dimension: usize,
        timeout_secs: u64,
        cache_size: usize,
    ) -> Result<Self, EmbeddingError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();

        if format == ServiceFormat::OpenAi && api_key.is_none() {
            return Err(EmbeddingError::MissingConfiguration(
                "API key required for openai-compatible service".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        info!(
            "ServiceProvider initialized: format={}, model={}, dim={}, cache={}",
            format, model, dimension, cache_size
        );

        Ok(Self {
            format,
            base_url,
            model,
            api_key,
            dimension,
            client,
            cache: EmbeddingCache::new(cache_size),
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn model(&self) -> &str {
        &self.model
    }


    fn request_ollama(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()?
            .error_for_status()?
            .json::<OllamaEmbeddingResponse>()?;

        Ok(response.embedding)
    }

    fn request_openai(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| EmbeddingError::MissingConfiguration("API key required".to_string()))?;

        let request = OpenAIEmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()?
            .error_for_status()?
            .json::<OpenAIEmbeddingResponse>()?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding in response".to_string()))
    }
}

impl EmbeddingProvider for ServiceProvider {
    fn try_embed(&self, text: &str) -> Result<Option<EmbeddingVector>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        if let Some(cached) = self.cache.get(text) {
            debug!("Cache HIT for: {}...", crate::utils::safe_truncate(text, 50));
            return Ok(Some(cached));
        }

        let embedding = match self.format {
            ServiceFormat::Ollama => self.request_ollama(text)?,
            ServiceFormat::OpenAi => self.request_openai(text)?,
        };

        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                found: embedding.len(),
            });
        }

        self.cache.set(text, embedding.clone());
        Ok(Some(embedding))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn backend(&self) -> EmbeddingBackend {
        EmbeddingBackend::Service
    }
}
