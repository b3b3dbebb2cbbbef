use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use super::models::{BodyPart, BodyPartRecord};


#[derive(Debug, Error)]
pub enum BodyPartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed body part table: {0}")]
    Csv(#[from] csv::Error),
    #[error("Duplicate body part id {0}")]
    DuplicateId(u32),
}


/// Read-only body-part reference table keyed by id.
#[derive(Debug, Clone, Default)]
pub struct BodyPartTable {
    parts: BTreeMap<u32, BodyPart>,
}

impl BodyPartTable {
    pub fn from_parts(parts: impl IntoIterator<Item = BodyPart>) -> Result<Self, BodyPartError> {
        let mut table = BTreeMap::new();
        for part in parts {
            let id = part.id;
            if table.insert(id, part).is_some() {
                return Err(BodyPartError::DuplicateId(id));
            }
        }
        Ok(Self { parts: table })
    }


    /// Reads a headed CSV with columns `ID, NAME, REF_TO, IS_EXTERNAL,
    /// NOT_SPECIFICALLY_LOCATED, ONE_WORD` and an optional `ROOT_NODES`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BodyPartError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let parts = reader
            .deserialize::<BodyPartRecord>()
            .map(|record| record.map(BodyPart::from))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_parts(parts)
    }


    pub fn load(path: &Path) -> Result<Self, BodyPartError> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;

        let dangling = table
            .iter()
            .filter(|p| p.parent_id.is_some_and(|parent| !table.parts.contains_key(&parent)))
            .count();
        if dangling > 0 {
            warn!("{} body parts reference a missing parent", dangling);
        }

        info!("Loaded {} body parts from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn get(&self, id: u32) -> Option<&BodyPart> {
        self.parts.get(&id)
    }


    /// The larger body part `part` belongs to, if any.
    pub fn parent(&self, part: &BodyPart) -> Option<&BodyPart> {
        part.parent_id.and_then(|id| self.parts.get(&id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyPart> {
        self.parts.values()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
ID,NAME,REF_TO,IS_EXTERNAL,NOT_SPECIFICALLY_LOCATED,ONE_WORD,ROOT_NODES
1,trunk,,1,0,1,
2,chest/thorax,1,1,0,1,chest pain/chest discomfort
3,blood,,0,1,1,
";

    #[test]
    fn test_parse_table() {
        let table = BodyPartTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);

        let chest = table.get(2).unwrap();
        assert_eq!(chest.names, vec!["chest", "thorax"]);
        assert_eq!(chest.root_nodes, vec!["chest pain", "chest discomfort"]);
        assert!(chest.is_external);

        let blood = table.get(3).unwrap();
        assert!(blood.not_specifically_located);
        assert!(blood.root_nodes.is_empty());
        assert!(table.get(9).is_none());
    }

    #[test]
    fn test_parent_lookup() {
        let table = BodyPartTable::from_reader(TABLE.as_bytes()).unwrap();
        let chest = table.get(2).unwrap();
        assert_eq!(table.parent(chest).unwrap().id, 1);
        assert!(table.parent(table.get(1).unwrap()).is_none());
    }

    #[test]
    fn test_root_nodes_column_optional() {
        let csv = "ID,NAME,REF_TO,IS_EXTERNAL,NOT_SPECIFICALLY_LOCATED,ONE_WORD\n4,head,,1,0,1\n";
        let table = BodyPartTable::from_reader(csv.as_bytes()).unwrap();
        assert!(table.get(4).unwrap().root_nodes.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let csv = "ID,NAME,REF_TO,IS_EXTERNAL,NOT_SPECIFICALLY_LOCATED,ONE_WORD\n4,head,,1,0,1\n4,skull,,1,0,1\n";
        let err = BodyPartTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, BodyPartError::DuplicateId(4)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body_parts.csv");
        std::fs::write(&path, TABLE).unwrap();
        assert_eq!(BodyPartTable::load(&path).unwrap().len(), 3);
    }
}
