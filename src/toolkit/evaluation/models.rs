use serde::{Deserialize, Serialize};


/// One sentence's predicted concept ids against its ground truth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_sentence: Option<String>,
    #[serde(alias = "cui_predictions")]
    pub predictions: Vec<String>,
    #[serde(alias = "real_cuis")]
    pub real_concepts: Vec<String>,
}

impl PredictionRecord {
    pub fn new(predictions: Vec<String>, real_concepts: Vec<String>) -> Self {
        Self {
            text_sentence: None,
            predictions,
            real_concepts,
        }
    }
}


/// Ratios are `None` when there are no real concepts to divide by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentenceScore {
    pub correct: usize,
    pub redundant: usize,
    pub wrong: usize,
    pub missed: usize,
    pub real_concepts: usize,
    pub predictions: usize,
    pub accuracy: Option<f64>,
    pub attempts: Option<f64>,
}

impl SentenceScore {
    pub(crate) fn new(correct: usize, redundant: usize, wrong: usize, real_concepts: usize, predictions: usize) -> Self {
        Self {
            correct,
            redundant,
            wrong,
            missed: real_concepts.saturating_sub(correct),
            real_concepts,
            predictions,
            accuracy: ratio(correct, real_concepts),
            attempts: ratio(predictions, real_concepts),
        }
    }
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStatistics {
    pub sentences: usize,
    pub correct: usize,
    pub redundant: usize,
    pub wrong: usize,
    pub missed: usize,
    pub real_concepts: usize,
    pub predictions: usize,
    /// `(correct + redundant) / predictions`.
    pub precision: Option<f64>,
    /// `correct / real_concepts`.
    pub accuracy: Option<f64>,
    /// `predictions / real_concepts`.
    pub attempts: Option<f64>,
}

impl CorpusStatistics {
    pub fn from_scores<'a>(scores: impl IntoIterator<Item = &'a SentenceScore>) -> Self {
        let mut stats = Self::default();
        for score in scores {
            stats.sentences += 1;
            stats.correct += score.correct;
            stats.redundant += score.redundant;
            stats.wrong += score.wrong;
            stats.missed += score.missed;
            stats.real_concepts += score.real_concepts;
            stats.predictions += score.predictions;
        }
        stats.precision = ratio(stats.correct + stats.redundant, stats.predictions);
        stats.accuracy = ratio(stats.correct, stats.real_concepts);
        stats.attempts = ratio(stats.predictions, stats.real_concepts);
        stats
    }
}


/// Per-record scores in input order plus the corpus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub scores: Vec<SentenceScore>,
    pub statistics: CorpusStatistics,
}


fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accepts_legacy_field_names() {
        let record: PredictionRecord = serde_json::from_str(
            r#"{"text_sentence": "my head hurts", "cui_predictions": ["C1"], "real_cuis": ["C1", "C2"]}"#,
        )
        .unwrap();
        assert_eq!(record.predictions, vec!["C1"]);
        assert_eq!(record.real_concepts, vec!["C1", "C2"]);
        assert_eq!(record.text_sentence.as_deref(), Some("my head hurts"));
    }

    #[test]
    fn test_zero_denominators_are_undefined() {
        let score = SentenceScore::new(0, 0, 2, 0, 2);
        assert_eq!(score.accuracy, None);
        assert_eq!(score.attempts, None);
        assert_eq!(score.missed, 0);

        let json = serde_json::to_value(score).unwrap();
        assert!(json["accuracy"].is_null());

        let empty = CorpusStatistics::from_scores(std::iter::empty::<&SentenceScore>());
        assert_eq!(empty.precision, None);
        assert_eq!(empty.accuracy, None);
    }

    #[test]
    fn test_corpus_totals() {
        let scores = [SentenceScore::new(1, 1, 1, 1, 3), SentenceScore::new(0, 0, 0, 2, 0)];
        let stats = CorpusStatistics::from_scores(&scores);

        assert_eq!(stats.sentences, 2);
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.missed, 2);
        assert_eq!(stats.real_concepts, 3);
        assert_eq!(stats.precision, Some(2.0 / 3.0));
        assert_eq!(stats.accuracy, Some(1.0 / 3.0));
        assert_eq!(stats.attempts, Some(1.0));
    }
}
