// src/graph/mod.rs
//! Import resolution and dependency-graph metrics.

pub mod metrics;
pub mod resolver;

pub use metrics::{compute, depths, fan_in_scan, fan_out, DepthSolver, Metrics, ReverseIndex};
pub use resolver::{resolve, resolve_all, EdgeMap, Target};
