

pub mod embeddings;
pub mod factory;
pub mod providers;

pub use embeddings::{
    EmbeddingBackend, EmbeddingError, EmbeddingProvider, EmbeddingVector, OovPolicy, ServiceFormat,
};
pub use factory::EmbeddingProviderFactory;
pub use providers::{LookupTableProvider, ServiceProvider};
