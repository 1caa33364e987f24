pub mod edit;
pub mod query;
pub mod recompute;
