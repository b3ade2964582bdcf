use crate::comment_source::SourceIndex;
use crate::compiler::Compiler;
use crate::config::load_config;
use crate::routes::load_routes;
use crate::serializer::FileSink;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// Compile route handler annotations into OpenAPI documents, one per path-group
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path-group configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE", default_value = "openapi.yaml")]
    pub config: PathBuf,

    /// Route manifest (YAML or JSON)
    #[arg(short = 'r', long = "routes", value_name = "FILE", default_value = "routes.yaml")]
    pub routes: PathBuf,

    /// Directory containing the handler sources
    #[arg(short = 's', long = "source", value_name = "DIR", default_value = "src")]
    pub source: PathBuf,

    /// Directory the configured output paths are relative to
    #[arg(short = 'b', long = "base-dir", value_name = "DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.config.is_file() {
        anyhow::bail!("Config file does not exist: {}", args.config.display());
    }

    if !args.routes.is_file() {
        anyhow::bail!("Route manifest does not exist: {}", args.routes.display());
    }

    if !args.source.is_dir() {
        anyhow::bail!("Source path is not a directory: {}", args.source.display());
    }

    info!("Config: {}", args.config.display());
    info!("Routes: {}", args.routes.display());
    info!("Sources: {}", args.source.display());
    info!("Output base: {}", args.base_dir.display());

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Loading configuration...");
    let config = load_config(&args.config)?;
    if config.groups.is_empty() {
        warn!("No path-groups configured in {}", args.config.display());
    }

    info!("Loading routes...");
    let routes = load_routes(&args.routes)?;
    info!("Loaded {} routes", routes.len());

    info!("Indexing handler sources...");
    let index = SourceIndex::scan(&args.source)
        .with_context(|| format!("Failed to index sources in {}", args.source.display()))?;
    info!("Indexed {} handlers", index.len());

    let compiler = Compiler::new(&routes, &index);
    let mut sink = FileSink::new(args.base_dir.clone());
    let report = compiler.compile_all(&config, &mut sink);

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Routes: {}", routes.len());
    info!("  - Groups written: {}", report.written.len());
    for prefix in &report.written {
        if let Some(group) = config.groups.get(prefix) {
            info!("    {} -> {}", prefix, sink.output_path(group).display());
        }
    }
    info!("  - Groups failed: {}", report.failed.len());

    if !report.is_success() {
        let failed: Vec<&str> = report.failed.iter().map(|(prefix, _)| prefix.as_str()).collect();
        anyhow::bail!("Failed to compile path-groups: {}", failed.join(", "));
    }

    Ok(())
}
