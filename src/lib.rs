//! Core library functions for the connectivity mapper

pub mod cache;
pub mod components;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod report;
pub mod storage;
pub mod viz;

pub use cache::GraphCache;
pub use data::Point;
pub use error::{MapperError, Result};
pub use graph::{build_graph, BuildOutcome, ConnectivityGraph, Diagnostic};
pub use report::{analyze, analyze_with, AnalysisOptions, ConnectivityReport, EdgeLength, GraphMetrics};
