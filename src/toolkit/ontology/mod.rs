

pub mod hierarchy;
pub mod loader;
pub mod models;
mod tagging;

pub use hierarchy::{Ancestors, ConceptHierarchy};
pub use loader::{HierarchyError, HierarchyLoader};
pub use models::{ConceptKind, ConceptNode, NodeId, RawConceptNode};
