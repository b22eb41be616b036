//! Graph representation and algorithms module

pub mod algorithms;
pub mod builder;
pub mod compressed;

pub use builder::{build_graph, BuildOutcome, Diagnostic, GraphBuilder};
pub use compressed::ConnectivityGraph;
