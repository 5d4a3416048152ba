//! Error types for tinbuild
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::builder::Action;
use crate::core::test_runner::TestReport;

/// Project loading errors
#[derive(Error, Debug)]
pub enum ProjectError {
    /// No project manifest at the project root
    #[error("No project.toml found in {path}. Run tinbuild from inside a project or pass --project-dir.")]
    ManifestNotFound { path: PathBuf },

    /// Manifest could not be read
    #[error("Failed to read '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// Manifest could not be parsed
    #[error("Failed to parse '{path}': {error}")]
    ParseError { path: PathBuf, error: String },

    /// Repository id or path is unusable
    #[error("Invalid repository '{id}': {reason}")]
    InvalidRepository { id: String, reason: String },

    /// Repository directory does not exist
    #[error("Repository '{id}' not found at {path}")]
    RepositoryNotFound { id: String, path: PathBuf },

    /// Two packages claim the same name within one repository
    #[error("Duplicate package '{name}' in repository '{repo}': {first} and {second}")]
    DuplicatePackage {
        repo: String,
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// `[pkg] name` cannot be used as a package name
    #[error("Invalid package name '{name}' in {}: {reason}", path.display())]
    InvalidPackageName {
        name: String,
        path: PathBuf,
        reason: &'static str,
    },

    /// Directory walk failed
    #[error("Failed to scan '{path}': {error}")]
    ScanError { path: PathBuf, error: String },
}

/// Package name resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No package with this name
    #[error("invalid package name: {name}")]
    PackageNotFound { name: String },

    /// `@repo/...` names a repository the project does not define
    #[error("unknown repository '{repo}' in package name: {name}")]
    UnknownRepository { repo: String, name: String },

    /// Bare name matches packages in several repositories
    #[error("ambiguous package name '{name}'; candidates: {}", candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Builder construction and lifecycle action errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Target refers to a package the project does not contain
    #[error("Target '{target}' is invalid: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Entity was resolved under a different project generation
    #[error("'{entity}' belongs to project generation {entity_generation}, builder is bound to generation {builder_generation}")]
    StaleEntity {
        entity: String,
        entity_generation: u64,
        builder_generation: u64,
    },

    /// No command configured for the action
    #[error("No {action} command configured for target '{target}'")]
    MissingCommand { action: Action, target: String },

    /// Required executable not on PATH
    #[error("Required tool '{tool}' is not installed or not in PATH")]
    ToolNotFound { tool: String },

    /// Command could not be started
    #[error("Failed to run {action} command for target '{target}': {error}")]
    Spawn {
        action: Action,
        target: String,
        error: String,
    },

    /// Action needs the app image and it is not there
    #[error("No app image for target '{target}' at {}. Run 'tinbuild build {target}' first.", path.display())]
    ArtifactMissing { target: String, path: PathBuf },

    /// Action command exited unsuccessfully
    #[error("{action} failed for target '{target}' ({status})")]
    ActionFailed {
        action: Action,
        target: String,
        status: String,
        diagnostic: String,
    },

    /// Test command exited unsuccessfully
    #[error("Test failed for package '{package}' ({status})")]
    TestFailed {
        package: String,
        status: String,
        diagnostic: String,
    },

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

impl BuildError {
    /// Human-readable diagnostic, including captured tool output when there is any
    pub fn diagnostic(&self) -> String {
        match self {
            Self::ActionFailed { diagnostic, .. } | Self::TestFailed { diagnostic, .. }
                if !diagnostic.trim().is_empty() =>
            {
                format!("{self}\n{}", diagnostic.trim_end())
            }
            _ => self.to_string(),
        }
    }
}

/// Errors surfaced at the command boundary
#[derive(Error, Debug)]
pub enum CommandError {
    /// Missing arguments or unresolvable target name
    #[error("{}", message.as_deref().unwrap_or("missing required argument"))]
    Usage {
        command: &'static str,
        usage: &'static str,
        message: Option<String>,
    },

    /// Project state could not be initialized
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Package resolution failed; text is passed through unchanged
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Builder construction or a lifecycle action failed
    ///
    /// Display already includes the inner error, so it is not a source.
    #[error("{}", .0.diagnostic())]
    Build(BuildError),

    /// Filesystem error outside a builder
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// The fixed unit test target is not defined by the project
    #[error("Can't find unit test target: {name}")]
    MissingTestTarget { name: String },

    /// Selection came out empty
    #[error("No testable packages found")]
    NoTestablePackages,

    /// A selected package vanished after a project reset
    #[error("Failed to resolve package: {name}")]
    ReResolution { name: String },

    /// Batch completed with at least one failing package
    #[error("Test failure(s):\n{}\n{}", .0.passed_line(), .0.failed_line())]
    TestFailures(TestReport),
}

impl From<BuildError> for CommandError {
    fn from(error: BuildError) -> Self {
        Self::Build(error)
    }
}

impl CommandError {
    /// Usage error for `command`, with an optional explanation
    pub fn usage(command: &'static str, usage: &'static str, message: Option<String>) -> Self {
        Self::Usage {
            command,
            usage,
            message,
        }
    }

    /// Usage line to print after the error, if this is a usage error
    pub fn usage_line(&self) -> Option<String> {
        match self {
            Self::Usage { command, usage, .. } => Some(format!("Usage: tinbuild {command} {usage}")),
            _ => None,
        }
    }
}
