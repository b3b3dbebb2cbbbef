use std::collections::HashSet;

use tracing::{debug, warn};

use super::index::{ConceptEmbeddingIndex, IndexRow};
use crate::toolkit::body_parts::BodyPart;
use crate::toolkit::ontology::{ConceptHierarchy, NodeId};


/// Restricts the concept index to the hierarchy region a body part points at.
pub struct BodyPartPruner<'a> {
    hierarchy: &'a ConceptHierarchy,
    index: &'a ConceptEmbeddingIndex,
}

impl<'a> BodyPartPruner<'a> {
    pub fn new(hierarchy: &'a ConceptHierarchy, index: &'a ConceptEmbeddingIndex) -> Self {
        Self { hierarchy, index }
    }


    /// Resolves the body part's root-node names; unknown names are dropped.
    /// With nothing resolved the global root is returned.
    pub fn root_nodes(&self, body_part: &BodyPart) -> Vec<NodeId> {
        let mut resolved = Vec::new();
        for name in &body_part.root_nodes {
            match self.hierarchy.find_by_name(name) {
                Some(id) if !resolved.contains(&id) => resolved.push(id),
                Some(_) => {}
                None => warn!(
                    "Body part {} root node '{}' not found in hierarchy",
                    body_part.id, name
                ),
            }
        }

        if resolved.is_empty() {
            debug!("Body part {} has no resolvable root nodes, searching whole tree", body_part.id);
            resolved.push(self.hierarchy.root());
        }
        resolved
    }


    /// Index rows whose node lies in the union of the resolved subtrees, in
    /// index order.
    pub fn prune(&self, body_part: &BodyPart) -> Vec<&'a IndexRow> {
        let mut allowed: HashSet<(&str, &str)> = HashSet::new();
        for root in self.root_nodes(body_part) {
            for id in self.hierarchy.subtree(root) {
                let node = self.hierarchy.node(id);
                allowed.insert((node.normalized_name(), node.id()));
            }
        }

        let rows: Vec<&IndexRow> = self
            .index
            .rows()
            .iter()
            .filter(|row| allowed.contains(&(row.concept_name.as_str(), row.concept_id.as_str())))
            .collect();

        debug!(
            "Pruned index for body part {}: {}/{} rows",
            body_part.id,
            rows.len(),
            self.index.len()
        );
        rows
    }
}
