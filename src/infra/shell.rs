//! External command execution
//!
//! Toolchain commands are shell snippets run with `sh -c`. Their output is
//! captured so a failing action can carry it as its diagnostic.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cli::output::{create_spinner, spinner_enabled};

/// Shell used to run toolchain commands
pub const SHELL: &str = "sh";

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Whether the command exited successfully
    pub success: bool,
    /// Exit status description, e.g. `exit status: 2`
    pub status: String,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CapturedOutput {
    /// Stdout followed by stderr, skipping empty streams
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Locate the shell on PATH
pub fn find_shell() -> Option<PathBuf> {
    which::which(SHELL).ok()
}

/// Run `script` with `shell -c` in `dir`, capturing its output
///
/// Blocks until the command exits; there is no timeout. A spinner showing
/// `message` is drawn while it runs when output is interactive.
pub fn run_script(
    shell: &Path,
    script: &str,
    dir: &Path,
    env: &HashMap<String, String>,
    message: &str,
) -> io::Result<CapturedOutput> {
    let mut cmd = Command::new(shell);
    cmd.arg("-c").arg(script).current_dir(dir).envs(env);

    tracing::debug!("Running in {}: {script}", dir.display());

    let spinner = spinner_enabled().then(|| create_spinner(message));
    let output = cmd.output();
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let output = output?;

    Ok(CapturedOutput {
        success: output.status.success(),
        status: output.status.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run `script` with `shell -c` in `dir`, attached to the terminal
///
/// Used for interactive tools such as debuggers. Nothing is captured.
pub fn run_script_interactive(
    shell: &Path,
    script: &str,
    dir: &Path,
    env: &HashMap<String, String>,
) -> io::Result<CapturedOutput> {
    tracing::debug!("Running interactively in {}: {script}", dir.display());

    let status = Command::new(shell)
        .arg("-c")
        .arg(script)
        .current_dir(dir)
        .envs(env)
        .status()?;

    Ok(CapturedOutput {
        success: status.success(),
        status: status.to_string(),
        stdout: String::new(),
        stderr: String::new(),
    })
}
