

pub mod answers;
pub mod body_parts;
pub mod evaluation;
pub mod ontology;
pub mod search;


pub use answers::{AnswerInterpreter, Predictor, PredictorOptions, QuestionKey};
pub use body_parts::{BodyPart, BodyPartTable};
pub use evaluation::{CorpusStatistics, EvaluationReport, PredictionRecord, Scorer, SentenceScore};
pub use ontology::{ConceptHierarchy, ConceptKind, HierarchyLoader, NodeId};
pub use search::{ConceptEmbeddingIndex, ConceptResolver, MatchResult, SimilarityMatcher, SimilarityMeasure};
