//! Reconciles predicted concepts with ground-truth concept subtrees.
//!
//! Every real concept expands into a claim: its own id plus all descendant
//! ids. A prediction takes the first unclaimed claim containing it (correct);
//! failing that, it may fall in a claim an earlier prediction already took
//! (redundant); otherwise it is wrong.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, info};

use super::models::{CorpusStatistics, EvaluationReport, PredictionRecord, SentenceScore};
use crate::toolkit::ontology::ConceptHierarchy;
use crate::CLAIM_PLACEHOLDER;

type Claim<'h> = HashSet<&'h str>;


pub struct Scorer<'h> {
    hierarchy: &'h ConceptHierarchy,
}

impl<'h> Scorer<'h> {
    pub fn new(hierarchy: &'h ConceptHierarchy) -> Self {
        Self { hierarchy }
    }


    /// Ids unknown to the hierarchy expand to a placeholder claim that no
    /// prediction can match.
    fn claim(&self, concept_id: &str) -> Claim<'h> {
        match self.hierarchy.subtree_concept_ids(concept_id) {
            Some(ids) => ids.into_iter().collect(),
            None => {
                debug!("Real concept {} not in hierarchy, using placeholder claim", concept_id);
                HashSet::from([CLAIM_PLACEHOLDER])
            }
        }
    }


    pub fn score(&self, predictions: &[String], real_concepts: &[String]) -> SentenceScore {
        let mut unclaimed: Vec<Claim<'h>> = real_concepts.iter().map(|id| self.claim(id)).collect();
        let mut claimed: Vec<Claim<'h>> = Vec::new();

        let mut correct = 0;
        let mut redundant = 0;
        let mut wrong = 0;

        for prediction in predictions {
            let prediction = prediction.as_str();

            if let Some(pos) = unclaimed.iter().position(|claim| claim.contains(prediction)) {
                claimed.push(unclaimed.remove(pos));
                correct += 1;
            } else if claimed.iter().any(|claim| claim.contains(prediction)) {
                redundant += 1;
            } else {
                wrong += 1;
            }
        }

        SentenceScore::new(correct, redundant, wrong, real_concepts.len(), predictions.len())
    }


    pub fn score_record(&self, record: &PredictionRecord) -> SentenceScore {
        self.score(&record.predictions, &record.real_concepts)
    }


    /// Scores every record independently in parallel; output keeps input
    /// order.
    pub fn evaluate(&self, records: &[PredictionRecord]) -> EvaluationReport {
        let scores: Vec<SentenceScore> = records.par_iter().map(|r| self.score_record(r)).collect();
        let statistics = CorpusStatistics::from_scores(&scores);

        info!(
            "Evaluated {} sentences: correct={} redundant={} wrong={} missed={}",
            statistics.sentences,
            statistics.correct,
            statistics.redundant,
            statistics.wrong,
            statistics.missed
        );

        EvaluationReport { scores, statistics }
    }
}
