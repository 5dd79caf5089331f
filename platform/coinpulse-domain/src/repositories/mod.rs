pub mod artifacts;
pub mod cache;
pub mod datasets;
