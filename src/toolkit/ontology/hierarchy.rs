use std::collections::HashMap;
use std::fmt::Write;

use tracing::{debug, warn};

use super::models::{ConceptNode, NodeId, RawConceptNode};
use crate::utils::normalize_text;


/// Arena-backed concept tree. Parent -> children is the only ownership
/// relation; `specialization_of` is a plain [`NodeId`] lookup.
#[derive(Debug, Clone)]
pub struct ConceptHierarchy {
    nodes: Vec<ConceptNode>,
    by_name: HashMap<String, NodeId>,
    by_concept_id: HashMap<String, NodeId>,
}

impl ConceptHierarchy {

    /// Nodes are laid out in pre-order, so the root is always `NodeId(0)` and
    /// "first match" lookups mean first in a depth-first walk.
    pub fn from_raw(raw: &RawConceptNode) -> Self {
        let mut nodes: Vec<ConceptNode> = Vec::new();
        let mut stack: Vec<(&RawConceptNode, Option<NodeId>)> = vec![(raw, None)];

        while let Some((raw_node, parent)) = stack.pop() {
            let id = NodeId(nodes.len());
            nodes.push(ConceptNode::new(
                raw_node.name.clone(),
                raw_node.concept_name.clone(),
                parent,
            ));
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }
            for child in raw_node.children.iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        let mut by_name = HashMap::new();
        let mut by_concept_id = HashMap::new();
        let mut duplicate_names = 0usize;

        for (i, node) in nodes.iter().enumerate() {
            if by_name.contains_key(&node.normalized_name) {
                duplicate_names += 1;
                debug!(
                    "Duplicate normalized name '{}' ({})",
                    node.normalized_name, node.id
                );
            } else {
                by_name.insert(node.normalized_name.clone(), NodeId(i));
            }
            by_concept_id.entry(node.id.clone()).or_insert(NodeId(i));
        }

        if duplicate_names > 0 {
            warn!(
                "{} concept nodes share a normalized name with an earlier node; name lookup returns the first",
                duplicate_names
            );
        }

        Self {
            nodes,
            by_name,
            by_concept_id,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }


    /// Panics when `id` does not come from this hierarchy.
    pub fn node(&self, id: NodeId) -> &ConceptNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&ConceptNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut ConceptNode {
        &mut self.nodes[id.0]
    }


    /// Looks a node up by concept name; the query is normalized first.
    pub fn find_by_name(&self, concept_name: &str) -> Option<NodeId> {
        self.by_name.get(&normalize_text(concept_name)).copied()
    }


    pub fn find_by_concept_id(&self, concept_id: &str) -> Option<NodeId> {
        self.by_concept_id.get(concept_id).copied()
    }


    /// Every node in pre-order.
    pub fn preorder(&self) -> impl Iterator<Item = (NodeId, &ConceptNode)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }


    /// `id` followed by all its descendants, in pre-order. Empty when `id`
    /// does not belong to this hierarchy.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else { continue };
            out.push(current);
            stack.extend(node.children.iter().rev());
        }
        out
    }


    /// Concept ids of the subtree rooted at the first node carrying
    /// `concept_id`, or `None` if no node does.
    pub fn subtree_concept_ids(&self, concept_id: &str) -> Option<Vec<&str>> {
        let root = self.find_by_concept_id(concept_id)?;
        Some(
            self.subtree(root)
                .into_iter()
                .map(|id| self.nodes[id.0].id.as_str())
                .collect(),
        )
    }


    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: self.get(id).and_then(|n| n.parent),
        }
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }


    pub fn render(&self) -> String {
        let mut out = String::new();
        for id in self.subtree(self.root()) {
            let node = &self.nodes[id.0];
            let indent = "    ".repeat(self.depth(id));
            let _ = writeln!(out, "{indent}{} ({})", node.concept_name, node.id);
        }
        out
    }
}


pub struct Ancestors<'a> {
    hierarchy: &'a ConceptHierarchy,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.hierarchy.get(current).and_then(|n| n.parent);
        Some(current)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_tree() -> RawConceptNode {
        RawConceptNode::new("C1457887", "symptoms").with_children(vec![
            RawConceptNode::new("C0030193", "Pain").with_children(vec![
                RawConceptNode::new("C0008031", "Chest pain").with_children(vec![
                    RawConceptNode::new("C0232289", "Burning chest pain"),
                ]),
                RawConceptNode::new("C0018681", "Headache"),
            ]),
            RawConceptNode::new("C0015672", "Fatigue"),
            RawConceptNode::new("C0015967", "Fever"),
        ])
    }

    #[test]
    fn test_preorder_layout() {
        let h = ConceptHierarchy::from_raw(&sample_tree());
        let ids: Vec<&str> = h.preorder().map(|(_, n)| n.id()).collect();
        assert_eq!(
            ids,
            vec!["C1457887", "C0030193", "C0008031", "C0232289", "C0018681", "C0015672", "C0015967"]
        );
        assert!(h.node(h.root()).is_root());
    }

    #[test]
    fn test_find_by_name_normalizes_query() {
        let h = ConceptHierarchy::from_raw(&sample_tree());
        let id = h.find_by_name("CHEST-PAIN").unwrap();
        assert_eq!(h.node(id).id(), "C0008031");
        assert!(h.find_by_name("nausea").is_none());
    }

    #[test]
    fn test_find_by_concept_id() {
        let h = ConceptHierarchy::from_raw(&sample_tree());
        let id = h.find_by_concept_id("C0018681").unwrap();
        assert_eq!(h.node(id).concept_name(), "Headache");
        assert!(h.find_by_concept_id("C9999999").is_none());
    }

    #[test]
    fn test_subtree_ids() {
        let h = ConceptHierarchy::from_raw(&sample_tree());
        let ids = h.subtree_concept_ids("C0030193").unwrap();
        assert_eq!(ids, vec!["C0030193", "C0008031", "C0232289", "C0018681"]);
        assert_eq!(h.subtree_concept_ids("C0015967").unwrap(), vec!["C0015967"]);
        assert!(h.subtree_concept_ids("missing").is_none());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let h = ConceptHierarchy::from_raw(&sample_tree());
        let burning = h.find_by_concept_id("C0232289").unwrap();
        let names: Vec<&str> = h
            .ancestors(burning)
            .map(|a| h.node(a).concept_name())
            .collect();
        assert_eq!(names, vec!["Chest pain", "Pain", "symptoms"]);
        assert_eq!(h.depth(burning), 3);
        assert_eq!(h.depth(h.root()), 0);
    }

    #[test]
    fn test_foreign_node_id_is_ignored() {
        let h = ConceptHierarchy::from_raw(&sample_tree());
        let small = ConceptHierarchy::from_raw(&RawConceptNode::new("R", "symptoms"));
        let foreign = h.find_by_concept_id("C0232289").unwrap();

        assert!(small.get(foreign).is_none());
        assert!(small.subtree(foreign).is_empty());
        assert_eq!(small.ancestors(foreign).count(), 0);
        assert_eq!(small.depth(foreign), 0);
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let raw = RawConceptNode::new("R", "symptoms").with_children(vec![
            RawConceptNode::new("A", "Cough"),
            RawConceptNode::new("B", "cough"),
        ]);
        let h = ConceptHierarchy::from_raw(&raw);
        assert_eq!(h.len(), 3);
        assert_eq!(h.node(h.find_by_name("cough").unwrap()).id(), "A");
    }

    #[test]
    fn test_render() {
        let h = ConceptHierarchy::from_raw(&sample_tree());
        let rendered = h.render();
        assert!(rendered.starts_with("symptoms (C1457887)\n"));
        assert!(rendered.contains("\n        Chest pain (C0008031)\n"));
    }
}
