//! Output formatting and progress indicators
//!
//! Status lines are filtered by a process-wide verbosity level set once from
//! the command line. `tracing` is for diagnostics; everything a user is meant
//! to read goes through [`status_message`].

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CommandError;

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Default as u8);
static JSON: AtomicBool = AtomicBool::new(false);

/// How much status output to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    /// Errors and test diagnostics only
    Quiet = 0,
    /// Normal progress and results
    Default = 1,
    /// Everything, including tool output of successful actions
    Verbose = 2,
}

impl Verbosity {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Quiet,
            1 => Self::Default,
            _ => Self::Verbose,
        }
    }
}

/// Output settings from the command line and global config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Selected verbosity
    pub verbosity: Verbosity,
    /// Machine-readable output on stdout, status lines move to stderr
    pub json: bool,
}

impl OutputConfig {
    /// Build from `--quiet`, `--json` and the `-v` count
    ///
    /// `--quiet` wins over any number of `-v`.
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Default
        };
        Self { verbosity, json }
    }

    /// Make this configuration the process-wide one
    pub fn apply_global(self) {
        VERBOSITY.store(self.verbosity as u8, Ordering::Relaxed);
        JSON.store(self.json, Ordering::Relaxed);
    }
}

/// Current process-wide verbosity
pub fn verbosity() -> Verbosity {
    Verbosity::from_u8(VERBOSITY.load(Ordering::Relaxed))
}

/// Whether JSON output mode is active
pub fn json_mode() -> bool {
    JSON.load(Ordering::Relaxed)
}

/// Print `message` if the current verbosity is at least `level`
pub fn status_message(level: Verbosity, message: impl AsRef<str>) {
    if level > verbosity() {
        return;
    }
    let message = message.as_ref();
    if json_mode() {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

/// Print an error from the command boundary, with a usage hint when relevant
pub fn display_error(error: &anyhow::Error) {
    eprintln!("Error: {error:#}");
    if let Some(usage) = error
        .downcast_ref::<CommandError>()
        .and_then(CommandError::usage_line)
    {
        eprintln!();
        eprintln!("{usage}");
    }
}

/// Whether spinners should be drawn
pub fn spinner_enabled() -> bool {
    verbosity() > Verbosity::Quiet && !json_mode() && std::io::stderr().is_terminal()
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
