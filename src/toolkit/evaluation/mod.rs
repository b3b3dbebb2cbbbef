

pub mod models;
pub mod scorer;

pub use models::{CorpusStatistics, EvaluationReport, PredictionRecord, SentenceScore};
pub use scorer::Scorer;
