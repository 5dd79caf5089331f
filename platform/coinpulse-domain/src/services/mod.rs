pub mod aggregation;
pub mod merge;
pub mod normalize;
