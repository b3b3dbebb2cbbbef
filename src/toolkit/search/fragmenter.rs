//! Lexical fragmentation of a phrase into vectorized word subsets.
//!
//! A phrase with `k` distinct words yields `2^k - 1` subsentences, so the cost
//! of [`LexicalFragmenter::fragment`] is exponential in `k`. Nothing here caps
//! `k`: callers are expected to bound token length before fragmenting
//! (answer tokens are short spans, typically a handful of words).

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::llm::embeddings::{EmbeddingProvider, EmbeddingVector};
use crate::utils::{distinct_words, normalize_text};


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subsentence {
    pub text: String,
    #[serde(skip)]
    pub vector: EmbeddingVector,
}


pub struct LexicalFragmenter {
    provider: Arc<dyn EmbeddingProvider>,
}

impl LexicalFragmenter {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }


    /// Every non-empty subset of the distinct words of `phrase`, each joined
    /// with single spaces in alphabetical word order.
    pub fn subsentences(phrase: &str) -> Vec<String> {
        let cleaned = normalize_text(phrase);
        let words = distinct_words(&cleaned);

        let mut subsets: Vec<Vec<&str>> = vec![Vec::new()];
        for word in words {
            let existing = subsets.len();
            for i in 0..existing {
                let mut extended = subsets[i].clone();
                extended.push(word);
                subsets.push(extended);
            }
        }

        subsets
            .into_iter()
            .skip(1)
            .map(|subset| subset.join(" "))
            .collect()
    }


    /// Vectorizes every subsentence of `phrase` in parallel and keeps only
    /// those the provider could represent. Output order follows
    /// [`Self::subsentences`].
    pub fn fragment(&self, phrase: &str) -> Vec<Subsentence> {
        let candidates = Self::subsentences(phrase);
        let total = candidates.len();

        let vectorized: Vec<Subsentence> = candidates
            .into_par_iter()
            .filter_map(|text| {
                let vector = self.provider.embed(&text)?;
                Some(Subsentence { text, vector })
            })
            .collect();

        debug!(
            "Fragmented '{}': {}/{} subsentences vectorized",
            crate::utils::safe_truncate(phrase, 50),
            vectorized.len(),
            total
        );
        vectorized
    }
}
