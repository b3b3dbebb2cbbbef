

pub mod lookup_table;
pub mod service;

pub use lookup_table::LookupTableProvider;
pub use service::ServiceProvider;
