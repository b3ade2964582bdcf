//! OpenAPI from annotations - command-line compiler.
//!
//! Reads a route manifest, the handlers' doc comment annotations and a
//! path-group configuration, then writes one OpenAPI 3.0 document per group.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations [--config FILE] [--routes FILE] [--source DIR] [--base-dir DIR] [-v]
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-annotations --routes routes.yaml --source ./src -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_annotations::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI annotation compiler starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
