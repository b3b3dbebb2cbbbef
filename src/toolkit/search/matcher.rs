use std::cmp::Ordering;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use tracing::debug;

use super::fragmenter::Subsentence;
use super::index::IndexRow;
use super::similarity::SimilarityMeasure;
use crate::core::error::{ResolverError, Result};


/// Best concept for one subsentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptMatch {
    pub concept_id: String,
    pub concept_name: String,
    pub subsentence: String,
    pub similarity: f64,
}


/// Outcome for a whole token. `best` keeps the top-scoring triple even when it
/// fails the threshold; `found` is the only verdict callers should act on.
///
/// Serializes as `{"found": false}` when not found, so a rejected triple never
/// reaches the output.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub found: bool,
    pub best: Option<ConceptMatch>,
}

impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let best = self.best.as_ref().filter(|_| self.found);
        let mut state = serializer.serialize_struct("MatchResult", if best.is_some() { 5 } else { 1 })?;
        state.serialize_field("found", &best.is_some())?;
        if let Some(best) = best {
            state.serialize_field("predicted_concept_id", &best.concept_id)?;
            state.serialize_field("concept_name", &best.concept_name)?;
            state.serialize_field("subsentence", &best.subsentence)?;
            state.serialize_field("similarity", &best.similarity)?;
        }
        state.end()
    }
}

impl MatchResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            best: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.found
    }


    /// The predicted concept id, only when the match passed the threshold.
    pub fn concept_id(&self) -> Option<&str> {
        if !self.found {
            return None;
        }
        self.best.as_ref().map(|m| m.concept_id.as_str())
    }

    pub fn similarity(&self) -> Option<f64> {
        self.best.as_ref().map(|m| m.similarity)
    }
}


#[derive(Debug, Clone, Copy)]
pub struct SimilarityMatcher {
    measure: SimilarityMeasure,
    min_similarity: f64,
}

impl SimilarityMatcher {

    /// `min_similarity` must lie in [0, 1].
    pub fn new(measure: SimilarityMeasure, min_similarity: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&min_similarity) {
            return Err(ResolverError::configuration(format!(
                "min_similarity must be within [0, 1], got {min_similarity}"
            )));
        }
        Ok(Self {
            measure,
            min_similarity,
        })
    }

    pub fn measure(&self) -> SimilarityMeasure {
        self.measure
    }

    pub fn min_similarity(&self) -> f64 {
        self.min_similarity
    }


    /// One triple per subsentence (its best column, first column winning
    /// ties), sorted by similarity descending. The sort is stable, so equal
    /// scores keep subsentence order.
    pub fn ranked_matches(&self, subsentences: &[Subsentence], candidates: &[&IndexRow]) -> Vec<ConceptMatch> {
        if subsentences.is_empty() || candidates.is_empty() {
            return Vec::new();
        }

        let rows: Vec<&[f32]> = subsentences.iter().map(|s| s.vector.as_slice()).collect();
        let columns: Vec<&[f32]> = candidates.iter().map(|c| c.vector.as_slice()).collect();
        let matrix = self.measure.matrix(&rows, &columns);

        let mut matches: Vec<ConceptMatch> = matrix
            .iter()
            .zip(subsentences)
            .filter_map(|(scores, subsentence)| {
                let (column, similarity) = argmax(scores)?;
                let concept = candidates[column];
                Some(ConceptMatch {
                    concept_id: concept.concept_id.clone(),
                    concept_name: concept.concept_name.clone(),
                    subsentence: subsentence.text.clone(),
                    similarity,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(Ordering::Equal));
        matches
    }


    /// Only the single best subsentence decides the token. `found` requires a
    /// score strictly above the threshold.
    pub fn best_match(&self, subsentences: &[Subsentence], candidates: &[&IndexRow]) -> MatchResult {
        let Some(best) = self.ranked_matches(subsentences, candidates).into_iter().next() else {
            debug!(
                "No match: {} subsentences, {} candidates",
                subsentences.len(),
                candidates.len()
            );
            return MatchResult::not_found();
        };

        let found = best.similarity > self.min_similarity;
        debug!(
            "Best match '{}' -> {} ({}) similarity={:.4} found={}",
            best.subsentence, best.concept_name, best.concept_id, best.similarity, found
        );

        MatchResult {
            found,
            best: Some(best),
        }
    }
}


/// Index and value of the first maximum; NaN scores never win.
fn argmax(scores: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &score) in scores.iter().enumerate() {
        let score = if score.is_nan() { f64::NEG_INFINITY } else { score };
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((i, score)),
        }
    }
    best
}
