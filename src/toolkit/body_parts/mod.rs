

pub mod models;
pub mod table;

pub use models::BodyPart;
pub use table::{BodyPartError, BodyPartTable};
