//! Builder abstraction and the command-running builder
//!
//! A [`Builder`] is bound to one [`Target`] of one project generation and
//! exposes the action lifecycle. Builders are created through a
//! [`BuilderFactory`] for every action invocation and every test cycle and
//! are never reused across a project reset; the borrow on [`Project`] makes
//! that a compile-time property.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::output::{status_message, Verbosity};
use crate::config::defaults::BIN_DIR;
use crate::core::build_env::ActionEnvironment;
use crate::core::project::{Package, Project, Target};
use crate::core::resolver::resolve_package;
use crate::error::BuildError;
use crate::infra::{filesystem, shell};

/// Builder lifecycle actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Build,
    Clean,
    Test,
    Load,
    Debug,
    Size,
}

impl Action {
    /// Lowercase action name, as used on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Clean => "clean",
            Self::Test => "test",
            Self::Load => "load",
            Self::Debug => "debug",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root of all build output for the project at `project_root`
pub fn bin_root(project_root: &Path) -> PathBuf {
    project_root.join(BIN_DIR)
}

/// Action lifecycle of one target
pub trait Builder {
    /// Build the target's app image
    fn build(&self) -> Result<(), BuildError>;

    /// Remove the target's build output
    fn clean(&self) -> Result<(), BuildError>;

    /// Build and run the unit tests of `package`
    fn test(&self, package: &Package) -> Result<(), BuildError>;

    /// Load the app image onto the board
    fn load(&self) -> Result<(), BuildError>;

    /// Open a debugger session on the board
    fn debug(&self) -> Result<(), BuildError>;

    /// Report the size breakdown of the app image
    fn size(&self) -> Result<(), BuildError>;

    /// Path of the app image this builder produces
    fn app_elf_path(&self) -> PathBuf;
}

/// Creates builders for resolved targets
pub trait BuilderFactory {
    /// Create a fresh builder bound to `target` of `project`
    fn new_builder<'p>(
        &self,
        project: &'p Project,
        target: &'p Target,
    ) -> Result<Box<dyn Builder + 'p>, BuildError>;
}

/// Factory for [`CommandBuilder`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBuilderFactory;

impl BuilderFactory for CommandBuilderFactory {
    fn new_builder<'p>(
        &self,
        project: &'p Project,
        target: &'p Target,
    ) -> Result<Box<dyn Builder + 'p>, BuildError> {
        Ok(Box::new(CommandBuilder::new(project, target)?))
    }
}

/// Builder that runs the target's configured toolchain commands
///
/// Output layout under the bin root:
///
/// ```text
/// bin/<target>/app/<app basename>.elf
/// bin/<target>/test/<repository>/<package name>/
/// ```
#[derive(Debug)]
pub struct CommandBuilder<'p> {
    project: &'p Project,
    target: &'p Target,
    shell: PathBuf,
    bin_dir: PathBuf,
    elf_path: PathBuf,
}

impl<'p> CommandBuilder<'p> {
    /// Create a builder for `target`
    ///
    /// Fails if the target belongs to another generation, if its app or bsp
    /// package does not exist, or if no shell is available.
    pub fn new(project: &'p Project, target: &'p Target) -> Result<Self, BuildError> {
        if target.generation() != project.generation() {
            return Err(BuildError::StaleEntity {
                entity: target.name().to_string(),
                entity_generation: target.generation(),
                builder_generation: project.generation(),
            });
        }

        for (role, name) in [("app", target.app()), ("bsp", target.bsp())] {
            resolve_package(project, name).map_err(|e| BuildError::InvalidTarget {
                target: target.name().to_string(),
                reason: format!("{role} package: {e}"),
            })?;
        }

        let shell = shell::find_shell().ok_or_else(|| BuildError::ToolNotFound {
            tool: shell::SHELL.to_string(),
        })?;

        let bin_dir = bin_root(project.root()).join(target.name());
        let app_base = target
            .app()
            .rsplit('/')
            .next()
            .unwrap_or_else(|| target.app());
        let elf_path = bin_dir.join("app").join(format!("{app_base}.elf"));

        tracing::debug!(
            "Created builder for target '{}' (generation {})",
            target.name(),
            project.generation()
        );

        Ok(Self {
            project,
            target,
            shell,
            bin_dir,
            elf_path,
        })
    }

    /// Output directory of this target
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Output directory for the test build of `package`, unique per repository
    pub fn test_dir(&self, package: &Package) -> PathBuf {
        self.bin_dir
            .join("test")
            .join(package.repo())
            .join(package.name())
    }

    fn environment(&self) -> ActionEnvironment {
        ActionEnvironment::for_target(
            self.project.root(),
            self.target,
            self.bin_dir.clone(),
            self.elf_path.clone(),
        )
    }

    fn require_app_image(&self) -> Result<(), BuildError> {
        if self.elf_path.is_file() {
            Ok(())
        } else {
            Err(BuildError::ArtifactMissing {
                target: self.target.name().to_string(),
                path: self.elf_path.clone(),
            })
        }
    }

    /// Run the command configured for `action`
    fn run(
        &self,
        action: Action,
        env: &ActionEnvironment,
    ) -> Result<shell::CapturedOutput, BuildError> {
        let script = self
            .target
            .toolchain()
            .command(action)
            .ok_or_else(|| BuildError::MissingCommand {
                action,
                target: self.target.name().to_string(),
            })?;

        let root = self.project.root();
        let env_map = env.to_env_map();
        let result = if action == Action::Debug {
            shell::run_script_interactive(&self.shell, script, root, &env_map)
        } else {
            let message = match &env.package {
                Some(package) => format!("{action} {}", package.name),
                None => format!("{action} {}", self.target.name()),
            };
            shell::run_script(&self.shell, script, root, &env_map, &message)
        };

        result.map_err(|e| BuildError::Spawn {
            action,
            target: self.target.name().to_string(),
            error: e.to_string(),
        })
    }

    /// Run a target-level action and turn a non-zero exit into an error
    fn run_checked(&self, action: Action) -> Result<shell::CapturedOutput, BuildError> {
        let output = self.run(action, &self.environment())?;
        if output.success {
            Ok(output)
        } else {
            let diagnostic = output.combined();
            Err(BuildError::ActionFailed {
                action,
                target: self.target.name().to_string(),
                status: output.status,
                diagnostic,
            })
        }
    }
}

fn print_tool_output(output: &shell::CapturedOutput, level: Verbosity) {
    let text = output.combined();
    if !text.trim().is_empty() {
        status_message(level, text.trim_end());
    }
}

impl Builder for CommandBuilder<'_> {
    fn build(&self) -> Result<(), BuildError> {
        filesystem::create_dir_all(&self.bin_dir)?;
        let output = self.run_checked(Action::Build)?;
        print_tool_output(&output, Verbosity::Verbose);
        self.require_app_image()
    }

    fn clean(&self) -> Result<(), BuildError> {
        tracing::info!("Cleaning {}", self.bin_dir.display());
        filesystem::remove_dir_all(&self.bin_dir)?;
        Ok(())
    }

    fn test(&self, package: &Package) -> Result<(), BuildError> {
        if package.generation() != self.target.generation() {
            return Err(BuildError::StaleEntity {
                entity: package.full_name().to_string(),
                entity_generation: package.generation(),
                builder_generation: self.target.generation(),
            });
        }

        let test_dir = self.test_dir(package);
        filesystem::create_dir_all(&test_dir)?;

        let env = self.environment().with_package(package, test_dir);
        let output = self.run(Action::Test, &env)?;
        if !output.success {
            let diagnostic = output.combined();
            return Err(BuildError::TestFailed {
                package: package.full_name().to_string(),
                status: output.status,
                diagnostic,
            });
        }
        print_tool_output(&output, Verbosity::Verbose);
        Ok(())
    }

    fn load(&self) -> Result<(), BuildError> {
        self.require_app_image()?;
        let output = self.run_checked(Action::Load)?;
        print_tool_output(&output, Verbosity::Verbose);
        Ok(())
    }

    fn debug(&self) -> Result<(), BuildError> {
        self.require_app_image()?;
        let output = self.run_checked(Action::Debug)?;
        print_tool_output(&output, Verbosity::Verbose);
        Ok(())
    }

    fn size(&self) -> Result<(), BuildError> {
        self.require_app_image()?;
        // The size report is the result of the action
        let output = self.run_checked(Action::Size)?;
        print_tool_output(&output, Verbosity::Default);
        Ok(())
    }

    fn app_elf_path(&self) -> PathBuf {
        self.elf_path.clone()
    }
}
