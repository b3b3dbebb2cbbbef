use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use super::hierarchy::ConceptHierarchy;
use super::models::RawConceptNode;


#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("Cannot read hierarchy file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed hierarchy description: {0}")]
    Parse(#[from] serde_json::Error),
}


pub struct HierarchyLoader;

impl HierarchyLoader {

    pub fn from_json_str(json: &str) -> Result<ConceptHierarchy, HierarchyError> {
        let raw: RawConceptNode = serde_json::from_str(json)?;
        Ok(ConceptHierarchy::from_raw(&raw))
    }


    /// Reads the tree once and runs the structural tagging passes.
    pub fn load(path: &Path) -> Result<ConceptHierarchy, HierarchyError> {
        info!("Loading concept hierarchy from {}", path.display());
        let json = fs::read_to_string(path)?;
        let mut hierarchy = Self::from_json_str(&json)?;
        hierarchy.tag_structure();
        info!("Loaded {} concept nodes", hierarchy.len());
        Ok(hierarchy)
    }
}
