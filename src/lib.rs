pub mod analysis;
pub mod churn;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coverage;
pub mod discovery;
pub mod error;
pub mod events;
pub mod exit;
pub mod graph;
pub mod index;
pub mod lang;
pub mod manifest;
pub mod pipeline;
pub mod reporting;
pub mod utils;
pub mod validate;
