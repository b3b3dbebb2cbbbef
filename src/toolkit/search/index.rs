//! Concept-name embedding table, built once per embedding configuration and
//! persisted as headerless CSV rows of
//! `normalized_concept_name, concept_id, v0 .. v(d-1)`.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::llm::embeddings::{EmbeddingProvider, EmbeddingVector};
use crate::toolkit::ontology::ConceptHierarchy;


#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Malformed index row {row}: {reason}")]
    Format { row: usize, reason: String },
    #[error("Index dimension {index} does not match embedding dimension {provider}")]
    DimensionMismatch { index: usize, provider: usize },
}


#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub concept_name: String,
    pub concept_id: String,
    pub vector: EmbeddingVector,
}


#[derive(Debug, Clone)]
pub struct ConceptEmbeddingIndex {
    dimension: usize,
    rows: Vec<IndexRow>,
}

impl ConceptEmbeddingIndex {

    /// Vectorizes every node's normalized name in pre-order. Nodes the
    /// provider cannot represent are left out; their descendants are still
    /// tried.
    pub fn build(hierarchy: &ConceptHierarchy, provider: &dyn EmbeddingProvider) -> Self {
        let nodes: Vec<_> = hierarchy.preorder().map(|(_, node)| node).collect();

        let rows: Vec<IndexRow> = nodes
            .par_iter()
            .filter_map(|node| {
                let vector = provider.embed_concept_name(node.normalized_name())?;
                Some(IndexRow {
                    concept_name: node.normalized_name().to_string(),
                    concept_id: node.id().to_string(),
                    vector,
                })
            })
            .collect();

        info!(
            "Built concept index: {}/{} concept names vectorized",
            rows.len(),
            nodes.len()
        );

        Self {
            dimension: provider.dimension(),
            rows,
        }
    }


    pub fn from_rows(dimension: usize, rows: Vec<IndexRow>) -> Result<Self, IndexError> {
        for (i, row) in rows.iter().enumerate() {
            if row.vector.len() != dimension {
                return Err(IndexError::Format {
                    row: i + 1,
                    reason: format!("expected {dimension} components, found {}", row.vector.len()),
                });
            }
        }
        Ok(Self { dimension, rows })
    }


    /// Loads the table at `path` when present; otherwise builds it from the
    /// hierarchy and writes it there.
    pub fn build_or_load(
        path: &Path,
        hierarchy: &ConceptHierarchy,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self, IndexError> {
        if path.is_file() {
            let index = Self::load(path, provider.dimension())?;
            info!("Loaded concept index ({} rows) from {}", index.len(), path.display());
            return Ok(index);
        }

        info!("Concept index {} not found, computing it", path.display());
        let index = Self::build(hierarchy, provider);
        index.save(path)?;
        Ok(index)
    }


    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(self.dimension + 2);
            record.push(row.concept_name.clone());
            record.push(row.concept_id.clone());
            record.extend(row.vector.iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        info!("Saved concept index ({} rows) to {}", self.rows.len(), path.display());
        Ok(())
    }


    pub fn load(path: &Path, dimension: usize) -> Result<Self, IndexError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row_no = i + 1;

            if record.len() != dimension + 2 {
                return Err(IndexError::DimensionMismatch {
                    index: record.len().saturating_sub(2),
                    provider: dimension,
                });
            }

            let vector = record
                .iter()
                .skip(2)
                .map(|field| {
                    field.parse::<f32>().map_err(|e| IndexError::Format {
                        row: row_no,
                        reason: format!("'{field}' is not a number: {e}"),
                    })
                })
                .collect::<Result<EmbeddingVector, _>>()?;

            rows.push(IndexRow {
                concept_name: record[0].to_string(),
                concept_id: record[1].to_string(),
                vector,
            });
        }

        Ok(Self { dimension, rows })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[IndexRow] {
        &self.rows
    }


    /// The whole index as a candidate pool for the matcher.
    pub fn candidates(&self) -> Vec<&IndexRow> {
        self.rows.iter().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::embeddings::OovPolicy;
    use crate::llm::providers::LookupTableProvider;
    use crate::toolkit::ontology::hierarchy::tests::sample_tree;

    pub(crate) fn sample_provider() -> LookupTableProvider {
        let mut p = LookupTableProvider::new(3, OovPolicy::Strict);
        p.insert("pain", vec![1.0, 0.0, 0.0]).unwrap();
        p.insert("chest", vec![0.0, 1.0, 0.0]).unwrap();
        p.insert("headache", vec![0.0, 0.0, 1.0]).unwrap();
        p.insert("fever", vec![0.6, 0.0, 0.8]).unwrap();
        p.insert("fatigue", vec![0.0, 0.5, 0.5]).unwrap();
        p.insert("symptoms", vec![0.3, 0.3, 0.3]).unwrap();
        p
    }

    #[test]
    fn test_build_skips_unvectorizable_names() {
        let hierarchy = ConceptHierarchy::from_raw(&sample_tree());
        let index = ConceptEmbeddingIndex::build(&hierarchy, &sample_provider());

        let ids: Vec<&str> = index.rows().iter().map(|r| r.concept_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["C1457887", "C0030193", "C0008031", "C0018681", "C0015672", "C0015967"]
        );
        assert_eq!(index.rows()[2].concept_name, "chest pain");
        assert_eq!(index.rows()[2].vector, vec![0.5, 0.5, 0.0]);
        assert_eq!(index.dimension(), 3);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("concept_names.csv");
        let hierarchy = ConceptHierarchy::from_raw(&sample_tree());
        let index = ConceptEmbeddingIndex::build(&hierarchy, &sample_provider());

        index.save(&path).unwrap();
        let loaded = ConceptEmbeddingIndex::load(&path, 3).unwrap();
        assert_eq!(loaded.rows(), index.rows());
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        let hierarchy = ConceptHierarchy::from_raw(&sample_tree());

        ConceptEmbeddingIndex::build(&hierarchy, &sample_provider())
            .save(&first)
            .unwrap();
        ConceptEmbeddingIndex::build(&hierarchy, &sample_provider())
            .save(&second)
            .unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_build_or_load_reuses_persisted_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concept_names_lookup_table_3d.csv");
        let hierarchy = ConceptHierarchy::from_raw(&sample_tree());

        let built = ConceptEmbeddingIndex::build_or_load(&path, &hierarchy, &sample_provider()).unwrap();
        assert!(path.is_file());

        let empty_provider = LookupTableProvider::new(3, OovPolicy::Strict);
        let loaded = ConceptEmbeddingIndex::build_or_load(&path, &hierarchy, &empty_provider).unwrap();
        assert_eq!(loaded.rows(), built.rows());
    }

    #[test]
    fn test_load_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.csv");
        fs::write(&path, "chest pain,C0008031,0.1,0.2\n").unwrap();

        let err = ConceptEmbeddingIndex::load(&path, 3).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { index: 2, provider: 3 }));
    }

    #[test]
    fn test_load_rejects_non_numeric_component() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.csv");
        fs::write(&path, "chest pain,C0008031,0.1,abc\n").unwrap();

        let err = ConceptEmbeddingIndex::load(&path, 2).unwrap_err();
        assert!(matches!(err, IndexError::Format { row: 1, .. }));
    }

    #[test]
    fn test_from_rows_validates_width() {
        let rows = vec![IndexRow {
            concept_name: "fever".into(),
            concept_id: "C0015967".into(),
            vector: vec![1.0],
        }];
        assert!(ConceptEmbeddingIndex::from_rows(2, rows).is_err());
    }
}
