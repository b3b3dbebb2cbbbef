//! Static word -> vector table (GloVe text format).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::llm::embeddings::{
    mean_vector, EmbeddingBackend, EmbeddingError, EmbeddingProvider, EmbeddingVector, OovPolicy,
};


#[derive(Debug)]
pub struct LookupTableProvider {
    dimension: usize,
    words: HashMap<String, EmbeddingVector>,
    concept_words: HashMap<String, EmbeddingVector>,
    oov_policy: OovPolicy,
}

impl LookupTableProvider {

    pub fn new(dimension: usize, oov_policy: OovPolicy) -> Self {
        Self {
            dimension,
            words: HashMap::new(),
            concept_words: HashMap::new(),
            oov_policy,
        }
    }


    /// Imports at most `max_words` rows from a whitespace-separated
    /// `word v0 .. v(d-1)` file. Rows are expected in frequency order.
    pub fn from_file(
        path: &Path,
        dimension: usize,
        max_words: usize,
        oov_policy: OovPolicy,
    ) -> Result<Self, EmbeddingError> {
        let mut provider = Self::new(dimension, oov_policy);
        provider.words = read_table(path, dimension, Some(max_words))?;
        info!(
            "Lookup table loaded: {} words, dim={} from {}",
            provider.words.len(),
            dimension,
            path.display()
        );
        Ok(provider)
    }


    /// Adds the supplementary table consulted first for concept-name words.
    pub fn with_concept_words_file(mut self, path: &Path) -> Result<Self, EmbeddingError> {
        self.concept_words = read_table(path, self.dimension, None)?;
        info!("Concept-word table loaded: {} words", self.concept_words.len());
        Ok(self)
    }


    pub fn insert(&mut self, word: impl Into<String>, vector: EmbeddingVector) -> Result<(), EmbeddingError> {
        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                found: vector.len(),
            });
        }
        self.words.insert(word.into(), vector);
        Ok(())
    }


    pub fn insert_concept_word(
        &mut self,
        word: impl Into<String>,
        vector: EmbeddingVector,
    ) -> Result<(), EmbeddingError> {
        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                found: vector.len(),
            });
        }
        self.concept_words.insert(word.into(), vector);
        Ok(())
    }

    pub fn vocabulary_size(&self) -> usize {
        self.words.len()
    }

    pub fn oov_policy(&self) -> OovPolicy {
        self.oov_policy
    }


    fn vectorize<'a, F>(&'a self, text: &str, lookup: F) -> Option<EmbeddingVector>
    where
        F: Fn(&str) -> Option<&'a EmbeddingVector>,
    {
        let mut found = Vec::new();
        let mut total = 0usize;

        for word in text.split_whitespace() {
            total += 1;
            match lookup(word) {
                Some(vector) => found.push(vector),
                None if self.oov_policy == OovPolicy::Strict => {
                    debug!("Out-of-vocabulary word '{}' rejects '{}'", word, text);
                    return None;
                }
                None => {}
            }
        }

        if total == 0 {
            return None;
        }
        mean_vector(found, self.dimension)
    }
}

impl EmbeddingProvider for LookupTableProvider {
    fn try_embed(&self, text: &str) -> Result<Option<EmbeddingVector>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }
        Ok(self.vectorize(text, |w| self.words.get(w)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn backend(&self) -> EmbeddingBackend {
        EmbeddingBackend::LookupTable
    }

    fn embed_concept_name(&self, concept_name: &str) -> Option<EmbeddingVector> {
        if concept_name.trim().is_empty() {
            return None;
        }
        self.vectorize(concept_name, |w| {
            self.concept_words.get(w).or_else(|| self.words.get(w))
        })
    }
}


fn read_table(
    path: &Path,
    dimension: usize,
    max_rows: Option<usize>,
) -> Result<HashMap<String, EmbeddingVector>, EmbeddingError> {
    let reader = BufReader::new(File::open(path)?);
    let mut table = HashMap::new();
    let limit = max_rows.unwrap_or(usize::MAX);

    for (i, line) in reader.lines().enumerate().take(limit) {
        let line = line?;
        let line_no = i + 1;
        let mut parts = line.split(' ').filter(|p| !p.is_empty());

        let Some(word) = parts.next() else {
            continue;
        };

        let vector = parts
            .map(|p| {
                p.parse::<f32>().map_err(|e| EmbeddingError::MalformedTable {
                    line: line_no,
                    reason: format!("'{p}' is not a number: {e}"),
                })
            })
            .collect::<Result<EmbeddingVector, _>>()?;

        if vector.len() != dimension {
            return Err(EmbeddingError::MalformedTable {
                line: line_no,
                reason: format!("expected {dimension} components, found {}", vector.len()),
            });
        }

        table.entry(word.to_string()).or_insert(vector);
    }

    Ok(table)
}
