//! Target action dispatch
//!
//! Resolves the target named on the command line, creates a fresh builder
//! for it and runs exactly one lifecycle action.

use std::path::PathBuf;

use crate::cli::output::{status_message, Verbosity};
use crate::config::defaults::KEYWORD_ALL;
use crate::core::builder::{bin_root, Builder, BuilderFactory};
use crate::core::project::ProjectState;
use crate::core::resolver::resolve_target;
use crate::error::{BuildError, CommandError};
use crate::infra::filesystem;

/// Usage string shared by the single-target commands
pub const TARGET_USAGE: &str = "<target-name>";

/// Usage string of the clean command
pub const CLEAN_USAGE: &str = "<target-name>... | all";

const MUST_SPECIFY_TARGET: &str = "Must specify target";

/// Actions that operate on exactly one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAction {
    Build,
    Load,
    Debug,
    Size,
}

impl TargetAction {
    /// Command name on the command line
    pub fn command(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Load => "load",
            Self::Debug => "debug",
            Self::Size => "size",
        }
    }

    fn missing_target_message(self) -> Option<String> {
        match self {
            Self::Build => None,
            _ => Some(MUST_SPECIFY_TARGET.to_string()),
        }
    }

    fn invalid_target_message(self, name: &str) -> String {
        match self {
            Self::Build => format!("invalid target name: {name}"),
            _ => format!("Invalid target name: {name}"),
        }
    }

    fn invoke(self, builder: &dyn Builder) -> Result<(), BuildError> {
        match self {
            Self::Build => builder.build(),
            Self::Load => builder.load(),
            Self::Debug => builder.debug(),
            Self::Size => builder.size(),
        }
    }
}

/// Run `action` for the target named by the first argument
///
/// Extra arguments are ignored. Returns the app image path of the target.
pub fn run_action(
    state: &mut ProjectState,
    factory: &dyn BuilderFactory,
    action: TargetAction,
    args: &[String],
) -> Result<PathBuf, CommandError> {
    let project = state.initialize()?;

    let name = args.first().ok_or_else(|| {
        CommandError::usage(action.command(), TARGET_USAGE, action.missing_target_message())
    })?;
    let target = resolve_target(project, name).ok_or_else(|| {
        CommandError::usage(
            action.command(),
            TARGET_USAGE,
            Some(action.invalid_target_message(name)),
        )
    })?;

    tracing::info!("Running {} for target '{}'", action.command(), target.name());
    let builder = factory.new_builder(project, target)?;
    action.invoke(builder.as_ref())?;

    let elf = builder.app_elf_path();
    match action {
        TargetAction::Build => {
            status_message(
                Verbosity::Default,
                format!("App successfully built: {}", elf.display()),
            );
        }
        TargetAction::Load => {
            status_message(Verbosity::Verbose, format!("Loaded {}", elf.display()));
        }
        TargetAction::Debug => {
            status_message(
                Verbosity::Verbose,
                format!("Debug session for {} ended", target.name()),
            );
        }
        TargetAction::Size => {}
    }
    Ok(elf)
}

/// What a clean removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// The whole output root was removed
    pub removed_root: bool,
    /// Targets cleaned one by one, in argument order
    pub cleaned: Vec<String>,
}

/// Clean the named targets, or the whole output root for `all`
///
/// Every argument is validated first. With `all` present no per-target clean
/// runs at all.
pub fn clean(
    state: &mut ProjectState,
    factory: &dyn BuilderFactory,
    args: &[String],
) -> Result<CleanSummary, CommandError> {
    let project = state.initialize()?;
    if args.is_empty() {
        return Err(CommandError::usage(
            "clean",
            CLEAN_USAGE,
            Some(MUST_SPECIFY_TARGET.to_string()),
        ));
    }

    let mut clean_all = false;
    let mut targets = Vec::new();
    for arg in args {
        if arg == KEYWORD_ALL {
            clean_all = true;
            continue;
        }
        let target = resolve_target(project, arg).ok_or_else(|| {
            CommandError::usage(
                "clean",
                CLEAN_USAGE,
                Some(format!("invalid target name: {arg}")),
            )
        })?;
        targets.push(target);
    }

    if clean_all {
        let root = bin_root(project.root());
        status_message(
            Verbosity::Verbose,
            format!("Cleaning directory {}", root.display()),
        );
        filesystem::remove_dir_all(&root)?;
        return Ok(CleanSummary {
            removed_root: true,
            cleaned: Vec::new(),
        });
    }

    let mut summary = CleanSummary::default();
    for target in targets {
        let builder = factory.new_builder(project, target)?;
        builder.clean()?;
        summary.cleaned.push(target.name().to_string());
    }
    Ok(summary)
}
