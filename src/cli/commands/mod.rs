//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod action;
pub mod build;
pub mod clean;
pub mod pkg;
pub mod target;

use anyhow::Result;
use clap::Subcommand;

use crate::core::builder::CommandBuilderFactory;
use crate::core::dispatch::TargetAction;
use crate::core::project::ProjectState;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the app image of a target
    Build {
        /// Target name
        #[arg(value_name = "TARGET")]
        targets: Vec<String>,
    },

    /// Remove build output of targets, or everything with `all`
    Clean {
        /// Target names, or `all`
        #[arg(value_name = "TARGET")]
        targets: Vec<String>,
    },

    /// Run unit tests of packages, each against a freshly loaded project
    Test {
        /// Package names, or `all` for every testable package
        #[arg(value_name = "PACKAGE")]
        packages: Vec<String>,
    },

    /// Load the app image of a target onto the board
    Load {
        /// Target name
        #[arg(value_name = "TARGET")]
        targets: Vec<String>,
    },

    /// Open a debugger session for a target
    Debug {
        /// Target name
        #[arg(value_name = "TARGET")]
        targets: Vec<String>,
    },

    /// Show the size breakdown of a target's app image
    Size {
        /// Target name
        #[arg(value_name = "TARGET")]
        targets: Vec<String>,
    },

    /// Target inspection
    Target {
        #[command(subcommand)]
        command: TargetCommands,
    },

    /// Package inspection
    Pkg {
        #[command(subcommand)]
        command: PkgCommands,
    },
}

/// Target subcommands
#[derive(Subcommand, Debug)]
pub enum TargetCommands {
    /// List targets of the project
    List,
}

/// Package subcommands
#[derive(Subcommand, Debug)]
pub enum PkgCommands {
    /// List packages grouped by repository
    List,
}

impl Commands {
    /// Execute the command against `state`
    pub fn run(self, state: &mut ProjectState) -> Result<()> {
        let factory = CommandBuilderFactory;
        match self {
            Self::Build { targets } => build::execute(state, &factory, &targets),
            Self::Clean { targets } => clean::execute(state, &factory, &targets),
            Self::Test { packages } => test::execute(state, &factory, &packages),
            Self::Load { targets } => {
                action::execute(state, &factory, TargetAction::Load, &targets)
            }
            Self::Debug { targets } => {
                action::execute(state, &factory, TargetAction::Debug, &targets)
            }
            Self::Size { targets } => {
                action::execute(state, &factory, TargetAction::Size, &targets)
            }
            Self::Target { command } => match command {
                TargetCommands::List => target::execute_list(state),
            },
            Self::Pkg { command } => match command {
                PkgCommands::List => pkg::execute_list(state),
            },
        }
    }
}
