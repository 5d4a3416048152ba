//! tinbuild CLI - firmware build tool
//!
//! Entry point for the tinbuild command-line application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tinbuild::cli::output::{display_error, OutputConfig};
use tinbuild::cli::Cli;
use tinbuild::core::global_config::GlobalConfig;
use tinbuild::infra::dirs::TinbuildDirs;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let global = match GlobalConfig::load(&TinbuildDirs::new()) {
        Ok(config) => config,
        Err(e) => {
            display_error(&e.into());
            std::process::exit(1);
        }
    };

    let verbose = cli.verbose.max(u8::from(global.verbose()));
    let output_config = OutputConfig::new(cli.quiet || global.quiet(), cli.json, verbose);
    output_config.apply_global();

    match cli.run(global.toolchain) {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
