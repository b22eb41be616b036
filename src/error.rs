//! Error types for loading and analysing point networks

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the mapper core
#[derive(Error, Debug)]
pub enum MapperError {
    /// Input path missing or unreadable
    #[error("Cannot read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Top-level structure or a field value has the wrong shape
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A record lacks a required field
    #[error("Record {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// Metric preconditions (size, connectivity) not met
    #[error("Metric undefined: {0}")]
    UndefinedMetric(String),

    /// Strict mode refused a graph with build diagnostics
    #[error("Graph construction reported {0} diagnostic(s)")]
    Diagnostics(usize),
}

pub type Result<T> = std::result::Result<T, MapperError>;
