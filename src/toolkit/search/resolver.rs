//! Entry point for resolving answer tokens to concepts: owns the hierarchy
//! and the immutable concept index built once at initialization.

use std::sync::Arc;

use tracing::{debug, info};

use super::fragmenter::LexicalFragmenter;
use super::index::{ConceptEmbeddingIndex, IndexError};
use super::matcher::{MatchResult, SimilarityMatcher};
use super::pruning::BodyPartPruner;
use crate::core::config::ResolverConfig;
use crate::core::error::{ResolverError, Result};
use crate::llm::embeddings::EmbeddingProvider;
use crate::llm::factory::EmbeddingProviderFactory;
use crate::toolkit::body_parts::BodyPart;
use crate::toolkit::ontology::{ConceptHierarchy, HierarchyLoader};


pub struct ConceptResolver {
    hierarchy: ConceptHierarchy,
    index: ConceptEmbeddingIndex,
    fragmenter: LexicalFragmenter,
    matcher: SimilarityMatcher,
    provider: Arc<dyn EmbeddingProvider>,
}

impl ConceptResolver {
    pub fn new(
        hierarchy: ConceptHierarchy,
        index: ConceptEmbeddingIndex,
        provider: Arc<dyn EmbeddingProvider>,
        matcher: SimilarityMatcher,
    ) -> Result<Self> {
        if index.dimension() != provider.dimension() {
            return Err(IndexError::DimensionMismatch {
                index: index.dimension(),
                provider: provider.dimension(),
            }
            .into());
        }

        Ok(Self {
            hierarchy,
            index,
            fragmenter: LexicalFragmenter::new(Arc::clone(&provider)),
            matcher,
            provider,
        })
    }


    /// Validates `config`, builds the configured provider, loads the
    /// hierarchy and builds or loads the concept index.
    pub fn initialize(config: &ResolverConfig) -> Result<Self> {
        let provider = EmbeddingProviderFactory::from_config(config)?;
        Self::with_provider(config, provider)
    }


    /// The persisted index is keyed by the configured backend and
    /// dimension, so `provider` must agree with both.
    pub fn with_provider(config: &ResolverConfig, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        config.validate()?;
        if provider.backend() != config.embedding_backend || provider.dimension() != config.embedding_dimension {
            return Err(ResolverError::configuration(format!(
                "provider is {} {}d but configuration expects {} {}d",
                provider.backend(),
                provider.dimension(),
                config.embedding_backend,
                config.embedding_dimension
            )));
        }

        let hierarchy = HierarchyLoader::load(&config.hierarchy_path)?;
        let index = ConceptEmbeddingIndex::build_or_load(&config.index_path(), &hierarchy, provider.as_ref())?;
        let matcher = SimilarityMatcher::new(config.similarity_measure, config.min_similarity)?;

        info!(
            "Concept resolver ready: {} nodes, {} indexed names, measure={}, min_similarity={}",
            hierarchy.len(),
            index.len(),
            matcher.measure(),
            matcher.min_similarity()
        );
        Self::new(hierarchy, index, provider, matcher)
    }


    /// Matches `token` against the whole concept index.
    pub fn resolve_symptom_token(&self, token: &str) -> MatchResult {
        debug!("Resolving symptom token '{}'", token);
        let subsentences = self.fragmenter.fragment(token);
        self.matcher.best_match(&subsentences, &self.index.candidates())
    }


    /// Matches `token` against the index restricted to the body part's
    /// subtrees.
    pub fn resolve_body_part_token(&self, token: &str, body_part: &BodyPart) -> MatchResult {
        debug!("Resolving token '{}' for body part {}", token, body_part.id);
        let subsentences = self.fragmenter.fragment(token);
        let candidates = BodyPartPruner::new(&self.hierarchy, &self.index).prune(body_part);
        self.matcher.best_match(&subsentences, &candidates)
    }

    pub fn hierarchy(&self) -> &ConceptHierarchy {
        &self.hierarchy
    }

    pub fn index(&self) -> &ConceptEmbeddingIndex {
        &self.index
    }

    pub fn matcher(&self) -> &SimilarityMatcher {
        &self.matcher
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::toolkit::ontology::hierarchy::tests::sample_tree;
    use crate::toolkit::search::index::tests::sample_provider;
    use crate::toolkit::search::SimilarityMeasure;

    pub(crate) fn sample_resolver(min_similarity: f64) -> ConceptResolver {
        let mut hierarchy = ConceptHierarchy::from_raw(&sample_tree());
        hierarchy.tag_structure();
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(sample_provider());
        let index = ConceptEmbeddingIndex::build(&hierarchy, provider.as_ref());
        let matcher = SimilarityMatcher::new(SimilarityMeasure::Cosine, min_similarity).unwrap();
        ConceptResolver::new(hierarchy, index, provider, matcher).unwrap()
    }

    #[test]
    fn test_resolve_symptom_token() {
        let resolver = sample_resolver(0.5);

        let result = resolver.resolve_symptom_token("I have a headache");
        assert_eq!(result.concept_id(), Some("C0018681"));

        let result = resolver.resolve_symptom_token("so tired, fatigue");
        assert_eq!(result.concept_id(), Some("C0015672"));
    }

    #[test]
    fn test_unknown_words_not_found() {
        let resolver = sample_resolver(0.5);
        assert!(!resolver.resolve_symptom_token("dizziness").is_found());
        assert!(!resolver.resolve_symptom_token("").is_found());
    }

    #[test]
    fn test_resolve_body_part_token_uses_pruned_pool() {
        let resolver = sample_resolver(0.0);
        let chest = BodyPart::new(2, vec!["chest".into()]).with_root_nodes(vec!["chest pain".into()]);

        let result = resolver.resolve_body_part_token("fever", &chest);
        assert_eq!(result.concept_id(), Some("C0008031"));

        let unscoped = resolver.resolve_symptom_token("fever");
        assert_eq!(unscoped.concept_id(), Some("C0015967"));
    }

    #[test]
    fn test_provider_must_match_configured_index_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig {
            hierarchy_path: dir.path().join("symptom_tree.json"),
            index_dir: dir.path().join("index"),
            embedding_dimension: 50,
            ..ResolverConfig::default()
        };
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(sample_provider());

        let err = ConceptResolver::with_provider(&config, Arc::clone(&provider)).err().unwrap();
        assert!(matches!(err, ResolverError::Configuration(_)));
        assert!(!config.index_path().exists());

        let service = ResolverConfig {
            index_dir: dir.path().join("index"),
            embedding_dimension: provider.dimension(),
            ..ResolverConfig::for_service("http://localhost:11434", "nomic-embed-text")
        };
        let err = ConceptResolver::with_provider(&service, provider).err().unwrap();
        assert!(matches!(err, ResolverError::Configuration(_)));
        assert!(!service.index_path().exists());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let hierarchy = ConceptHierarchy::from_raw(&sample_tree());
        let index = ConceptEmbeddingIndex::from_rows(5, Vec::new()).unwrap();
        let matcher = SimilarityMatcher::new(SimilarityMeasure::Cosine, 0.0).unwrap();
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(sample_provider());

        assert!(ConceptResolver::new(hierarchy, index, provider, matcher).is_err());
    }
}
