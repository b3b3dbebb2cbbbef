use serde::{Deserialize, Serialize};


/// An anatomical body part from the reference table. `root_nodes` names the
/// hierarchy concepts whose subtrees scope searches for this part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPart {
    pub id: u32,
    pub names: Vec<String>,
    pub parent_id: Option<u32>,
    pub is_external: bool,
    pub not_specifically_located: bool,
    pub one_word: bool,
    pub root_nodes: Vec<String>,
}

impl BodyPart {
    pub fn new(id: u32, names: Vec<String>) -> Self {
        Self {
            id,
            one_word: names.iter().all(|n| n.split_whitespace().count() <= 1),
            names,
            parent_id: None,
            is_external: false,
            not_specifically_located: false,
            root_nodes: Vec::new(),
        }
    }

    pub fn with_root_nodes(mut self, root_nodes: Vec<String>) -> Self {
        self.root_nodes = root_nodes;
        self
    }

    pub fn with_parent(mut self, parent_id: u32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }


    /// The first listed name, used when a body part is appended to an answer.
    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }
}


/// Raw table row. Names and root nodes are slash-separated; flags are 0/1.
#[derive(Debug, Deserialize)]
pub(crate) struct BodyPartRecord {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "NAME")]
    pub names: String,
    #[serde(rename = "REF_TO", default)]
    pub ref_to: Option<u32>,
    #[serde(rename = "IS_EXTERNAL", default)]
    pub is_external: u8,
    #[serde(rename = "NOT_SPECIFICALLY_LOCATED", default)]
    pub not_specifically_located: u8,
    #[serde(rename = "ONE_WORD", default)]
    pub one_word: u8,
    #[serde(rename = "ROOT_NODES", default)]
    pub root_nodes: Option<String>,
}

impl From<BodyPartRecord> for BodyPart {
    fn from(record: BodyPartRecord) -> Self {
        Self {
            id: record.id,
            names: split_list(&record.names),
            parent_id: record.ref_to,
            is_external: record.is_external != 0,
            not_specifically_located: record.not_specifically_located != 0,
            one_word: record.one_word != 0,
            root_nodes: record.root_nodes.as_deref().map(split_list).unwrap_or_default(),
        }
    }
}

fn split_list(field: &str) -> Vec<String> {
    field
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
