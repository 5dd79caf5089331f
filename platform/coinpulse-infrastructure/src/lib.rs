pub mod artifacts;
pub mod datasets;
pub mod remote;
pub mod storage;
pub mod tables;
