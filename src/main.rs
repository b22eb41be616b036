use anyhow::{Context, Result};
use clap::Parser;
use connectivity_mapper::config::Config;
use connectivity_mapper::data::points;
use connectivity_mapper::storage::{self, ReportFormat};
use connectivity_mapper::{viz, AnalysisOptions, GraphCache, MapperError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "connectivity-mapper",
    about = "Connectivity analysis of point networks loaded from JSON"
)]
struct Cli {
    /// Path to input JSON point file
    #[clap(long)]
    input: PathBuf,

    /// Output directory for results
    #[clap(long, default_value = "relatorios")]
    output_dir: PathBuf,

    /// Report formats: json, text, csv, html or all (comma separated or repeated)
    #[clap(long = "format", value_delimiter = ',', default_value = "json")]
    formats: Vec<ReportFormat>,

    /// Source node for the shortest-path examples (default: smallest id)
    #[clap(long)]
    source: Option<String>,

    /// Target node for the shortest-path examples (repeatable)
    #[clap(long = "target")]
    targets: Vec<String>,

    /// Number of highest-degree nodes listed as hubs
    #[clap(long, default_value = "5")]
    hubs: usize,

    /// Skip GraphML/DOT network export
    #[clap(long)]
    skip_viz: bool,

    /// Fail when neighbors reference unknown points, self-loops or duplicate ids
    #[clap(long)]
    strict: bool,

    /// Print the canonical JSON report to stdout
    #[clap(long)]
    print: bool,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let config = Config::new(
        args.output_dir.clone(),
        args.formats.clone(),
        args.hubs,
        !args.skip_viz,
        args.strict,
    );

    log::info!("Starting connectivity analysis");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", config.output_dir.display());

    // 1. Load points
    let points = points::load_from_file(&args.input)?;

    // 2. Build graph
    let cache = GraphCache::new(config.cache_capacity);
    let outcome = cache.build(&points);

    if config.strict && !outcome.diagnostics.is_empty() {
        return Err(MapperError::Diagnostics(outcome.diagnostics.len()).into());
    }

    // 3. Analyse
    let options = AnalysisOptions {
        source: args.source.clone(),
        targets: args.targets.clone(),
        hub_count: config.hub_count,
    };
    let analysis = connectivity_mapper::analyze_with(&outcome.graph, &options);

    log::info!(
        "Graph has {} component(s); connected: {}",
        analysis.report.connected_components.len(),
        analysis.report.is_connected
    );

    // 4. Save results
    let written = storage::save_results(
        &analysis,
        &outcome,
        &config.resolved_formats(),
        &config.output_dir,
    )?;
    for path in &written {
        log::info!("Wrote {}", path.display());
    }

    // 5. Export network files if requested
    if config.export_network {
        viz::export_network(&outcome.graph, &analysis.components, &config.output_dir)?;
    }

    if args.print {
        let json = serde_json::to_string_pretty(&analysis.report)
            .context("Cannot serialize report")?;
        println!("{}", json);
    }

    log::info!("Analysis complete. Results saved to {}", config.output_dir.display());

    Ok(())
}
