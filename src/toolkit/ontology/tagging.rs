//! Structural tagging: specialization frontier, then base concepts.

use tracing::debug;

use super::hierarchy::ConceptHierarchy;
use super::models::{ConceptKind, NodeId};
use crate::utils::{contains_word, shares_word};
use crate::ROOT_MARKER_WORD;

impl ConceptHierarchy {

    /// Runs both passes from a clean slate, so repeated calls give the same
    /// tags.
    pub fn tag_structure(&mut self) {
        for i in 0..self.len() {
            self.node_mut(NodeId(i)).kind = None;
        }
        let specializations = self.tag_specializations();
        let bases = self.tag_bases();
        debug!(
            "Structural tagging: {} specializations, {} base concepts, {} unclassified",
            specializations,
            bases,
            self.len() - specializations - bases
        );
    }


    /// A non-root node is a specialization of its nearest ancestor whose name
    /// shares a word with it, skipping ancestors named with the root marker.
    fn tag_specializations(&mut self) -> usize {
        let mut tagged = 0;

        for i in 1..self.len() {
            let id = NodeId(i);
            let name = self.node(id).normalized_name();

            let target = self.ancestors(id).find(|&ancestor| {
                let ancestor_name = self.node(ancestor).normalized_name();
                !contains_word(ancestor_name, ROOT_MARKER_WORD) && shares_word(ancestor_name, name)
            });

            if let Some(of) = target {
                self.node_mut(id).kind = Some(ConceptKind::Specialization { of });
                tagged += 1;
            }
        }

        tagged
    }


    /// Depth-first from the root; descends only through nodes it tags itself,
    /// so nothing below a specialization is visited.
    fn tag_bases(&mut self) -> usize {
        let mut tagged = 0;
        let mut stack = vec![self.root()];

        while let Some(id) = stack.pop() {
            if self.node(id).kind.is_some() {
                continue;
            }
            self.node_mut(id).kind = Some(ConceptKind::Base);
            tagged += 1;
            stack.extend(self.node(id).children().iter().rev());
        }

        tagged
    }


    pub fn base_concepts(&self) -> Vec<NodeId> {
        self.preorder()
            .filter(|(_, n)| n.kind() == Some(ConceptKind::Base))
            .map(|(id, _)| id)
            .collect()
    }


    pub fn specializations(&self) -> Vec<(NodeId, NodeId)> {
        self.preorder()
            .filter_map(|(id, n)| n.specialization_of().map(|of| (id, of)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::hierarchy::tests::sample_tree;
    use super::super::models::RawConceptNode;
    use super::*;

    fn kind_of(h: &ConceptHierarchy, cui: &str) -> Option<ConceptKind> {
        h.node(h.find_by_concept_id(cui).unwrap()).kind()
    }

    fn tagged(raw: RawConceptNode) -> ConceptHierarchy {
        let mut h = ConceptHierarchy::from_raw(&raw);
        h.tag_structure();
        h
    }

    #[test]
    fn test_specialization_points_to_nearest_sharing_ancestor() {
        let h = tagged(sample_tree());
        let pain = h.find_by_concept_id("C0030193").unwrap();
        let chest = h.find_by_concept_id("C0008031").unwrap();

        assert_eq!(kind_of(&h, "C0008031"), Some(ConceptKind::Specialization { of: pain }));
        assert_eq!(kind_of(&h, "C0232289"), Some(ConceptKind::Specialization { of: chest }));
    }

    #[test]
    fn test_root_marker_ancestor_never_qualifies() {
        let raw = RawConceptNode::new("R", "symptoms").with_children(vec![
            RawConceptNode::new("A", "general symptoms").with_children(vec![
                RawConceptNode::new("B", "general malaise"),
            ]),
        ]);
        let h = tagged(raw);

        assert_eq!(kind_of(&h, "A"), Some(ConceptKind::Base));
        assert_eq!(kind_of(&h, "B"), Some(ConceptKind::Base));
    }

    #[test]
    fn test_base_pass_tags_root_and_unrelated_nodes() {
        let h = tagged(sample_tree());
        for cui in ["C1457887", "C0030193", "C0018681", "C0015672", "C0015967"] {
            assert_eq!(kind_of(&h, cui), Some(ConceptKind::Base), "{cui}");
        }
        assert_eq!(h.base_concepts().len(), 5);
        assert_eq!(h.specializations().len(), 2);
    }

    #[test]
    fn test_base_pass_stops_at_specialization_frontier() {
        let raw = RawConceptNode::new("R", "symptoms").with_children(vec![
            RawConceptNode::new("P", "pain").with_children(vec![
                RawConceptNode::new("CP", "chest pain").with_children(vec![
                    RawConceptNode::new("RA", "radiating to arm"),
                ]),
            ]),
        ]);
        let h = tagged(raw);

        assert!(matches!(kind_of(&h, "CP"), Some(ConceptKind::Specialization { .. })));
        assert_eq!(kind_of(&h, "RA"), None);
    }

    #[test]
    fn test_tagging_is_idempotent() {
        let mut h = tagged(sample_tree());
        let first: Vec<_> = h.preorder().map(|(_, n)| n.kind()).collect();

        h.tag_structure();
        let second: Vec<_> = h.preorder().map(|(_, n)| n.kind()).collect();

        assert_eq!(first, second);
    }
}
