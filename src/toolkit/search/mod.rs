

pub mod fragmenter;
pub mod index;
pub mod matcher;
pub mod pruning;
pub mod resolver;
pub mod similarity;

pub use fragmenter::{LexicalFragmenter, Subsentence};
pub use index::{ConceptEmbeddingIndex, IndexError, IndexRow};
pub use matcher::{ConceptMatch, MatchResult, SimilarityMatcher};
pub use pruning::BodyPartPruner;
pub use resolver::ConceptResolver;
pub use similarity::{cosine_similarity, euclidean_distance, SimilarityMeasure};
