//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::defaults::ENV_PROJECT_DIR;
use crate::core::manifest::ToolchainCommands;
use crate::core::project::ProjectState;
use commands::Commands;

/// tinbuild - build, test and load firmware for embedded targets
#[derive(Parser, Debug)]
#[command(name = "tinbuild")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and test diagnostics
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Project directory (default: nearest ancestor with a project.toml)
    #[arg(short = 'C', long, env = ENV_PROJECT_DIR, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    ///
    /// `defaults` fills toolchain commands the project leaves unset.
    pub fn run(self, defaults: ToolchainCommands) -> Result<()> {
        let Some(command) = self.command else {
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            return Ok(());
        };

        let root = match self.project_dir {
            Some(dir) => dir,
            None => {
                let current_dir = std::env::current_dir()?;
                ProjectState::discover(&current_dir).unwrap_or(current_dir)
            }
        };
        tracing::debug!("Project root: {}", root.display());

        let mut state = ProjectState::new(root).with_default_commands(defaults);
        command.run(&mut state)
    }
}
