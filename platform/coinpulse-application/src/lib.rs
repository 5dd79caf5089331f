pub mod config;
pub mod dashboard;
pub mod exports;
pub mod validation;
