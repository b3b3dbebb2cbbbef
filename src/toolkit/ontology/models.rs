use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::utils::normalize_text;


/// Position of a node inside its hierarchy's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}


/// Structural tag assigned once by [`ConceptHierarchy::tag_structure`].
///
/// [`ConceptHierarchy::tag_structure`]: super::ConceptHierarchy::tag_structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConceptKind {
    Base,
    /// Narrower case of the nearest ancestor sharing a word with this node.
    Specialization { of: NodeId },
}


/// Serialized tree form: `name` carries the concept id (CUI).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConceptNode {
    pub name: String,
    pub concept_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawConceptNode>,
}

impl RawConceptNode {
    pub fn new(name: impl Into<String>, concept_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            concept_name: concept_name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<RawConceptNode>) -> Self {
        self.children = children;
        self
    }
}


#[derive(Debug, Clone)]
pub struct ConceptNode {
    pub(crate) id: String,
    pub(crate) concept_name: String,
    pub(crate) normalized_name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: Option<ConceptKind>,
}

impl ConceptNode {
    pub(crate) fn new(id: String, concept_name: String, parent: Option<NodeId>) -> Self {
        let normalized_name = normalize_text(&concept_name);
        Self {
            id,
            concept_name,
            normalized_name,
            parent,
            children: Vec::new(),
            kind: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn concept_name(&self) -> &str {
        &self.concept_name
    }


    /// Lower-cased, non-alphabetic characters replaced by spaces. This is the
    /// node's logical key.
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }


    /// `None` until tagging runs, and for nodes beyond a specialization
    /// frontier that are not specializations themselves.
    pub fn kind(&self) -> Option<ConceptKind> {
        self.kind
    }

    pub fn specialization_of(&self) -> Option<NodeId> {
        match self.kind {
            Some(ConceptKind::Specialization { of }) => Some(of),
            _ => None,
        }
    }
}

impl PartialEq for ConceptNode {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_name == other.normalized_name
    }
}

impl Eq for ConceptNode {}

impl Hash for ConceptNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized_name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_uses_normalized_name() {
        let a = ConceptNode::new("C1".into(), "Chest Pain".into(), None);
        let b = ConceptNode::new("C2".into(), "chest-pain".into(), None);
        let c = ConceptNode::new("C1".into(), "Headache".into(), None);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_untagged_by_default() {
        let node = ConceptNode::new("C1".into(), "fever".into(), None);
        assert!(node.kind().is_none());
        assert!(node.specialization_of().is_none());
        assert!(node.is_root());
    }

    #[test]
    fn test_raw_node_json_shape() {
        let raw: RawConceptNode = serde_json::from_str(
            r#"{"name": "C1457887", "concept_name": "symptoms", "children": [{"name": "C0008031", "concept_name": "Chest pain"}]}"#,
        )
        .unwrap();
        assert_eq!(raw.name, "C1457887");
        assert_eq!(raw.children.len(), 1);
        assert!(raw.children[0].children.is_empty());
    }
}
