//! Configuration management for the connectivity mapper

use crate::storage::ReportFormat;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Default configuration for the connectivity mapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving every generated file
    pub output_dir: PathBuf,

    /// Report formats to write
    pub formats: Vec<ReportFormat>,

    /// Number of hub nodes listed in metrics and per component
    pub hub_count: usize,

    /// Maximum number of graphs kept by the build cache
    pub cache_capacity: NonZeroUsize,

    /// Write GraphML/DOT network files
    pub export_network: bool,

    /// Fail when graph construction reports diagnostics
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("relatorios"),
            formats: vec![ReportFormat::Json],
            hub_count: 5,
            cache_capacity: NonZeroUsize::new(16).unwrap_or(NonZeroUsize::MIN),
            export_network: true,
            strict: false,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        output_dir: impl Into<PathBuf>,
        formats: Vec<ReportFormat>,
        hub_count: usize,
        export_network: bool,
        strict: bool,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            formats,
            hub_count,
            export_network,
            strict,
            ..Self::default()
        }
    }

    /// Formats with `All` expanded and duplicates removed, in canonical order
    pub fn resolved_formats(&self) -> Vec<ReportFormat> {
        if self.formats.is_empty() {
            return vec![ReportFormat::Json];
        }
        if self.formats.contains(&ReportFormat::All) {
            return ReportFormat::concrete().to_vec();
        }

        ReportFormat::concrete()
            .iter()
            .copied()
            .filter(|format| self.formats.contains(format))
            .collect()
    }
}
