pub mod builder;
pub mod reference;
pub mod stats;

pub use builder::{StudentFilter, StudentQuery, list_students};
pub use reference::{RefTable, list_reference};
pub use stats::compute_statistics;
