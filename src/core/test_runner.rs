//! Batch package testing
//!
//! Each selected package is tested in its own cycle against a freshly loaded
//! project generation:
//!
//! 1. reset the project state
//! 2. re-initialize and resolve the `unittest` target
//! 3. create a new builder for it
//! 4. re-resolve the package by full name
//! 5. run the test action and record the outcome
//!
//! Test builds derive configuration from the package under test, so nothing
//! from one cycle may leak into the next. Cycles run strictly one after
//! another; a failing package is recorded and the batch moves on.

use serde::Serialize;

use crate::cli::output::{status_message, Verbosity};
use crate::config::defaults::{KEYWORD_ALL, TEST_TARGET_NAME};
use crate::core::builder::BuilderFactory;
use crate::core::project::{Project, ProjectState};
use crate::core::resolver::{resolve_package, resolve_target};
use crate::error::CommandError;

/// Usage string of the test command
pub const USAGE: &str = "<package-name>... | all";

/// A failed package and what its test action reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    /// Fully qualified package name
    pub package: String,
    /// Diagnostic text of the failure
    pub diagnostic: String,
}

/// Aggregated result of one batch test run, in selection order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestReport {
    /// Packages whose tests passed
    pub passed: Vec<String>,
    /// Packages whose tests failed
    pub failed: Vec<TestOutcome>,
    /// Project generation each cycle ran under
    pub generations: Vec<u64>,
}

impl TestReport {
    /// Whether every tested package passed
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }

    /// `Passed tests: [a b]`
    pub fn passed_line(&self) -> String {
        format!("Passed tests: [{}]", self.passed.join(" "))
    }

    /// `Failed tests: [a b]`
    pub fn failed_line(&self) -> String {
        let names: Vec<&str> = self.failed.iter().map(|o| o.package.as_str()).collect();
        format!("Failed tests: [{}]", names.join(" "))
    }
}

/// A package picked for testing, remembered by name across resets
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selected {
    full_name: String,
    name: String,
}

/// Run the test cycle for every package named in `args`
///
/// The literal `all` selects every testable package instead of the explicit
/// names. Explicit names are still resolved first, so a bad name aborts the
/// batch before any cycle runs.
pub fn run_tests(
    state: &mut ProjectState,
    factory: &dyn BuilderFactory,
    args: &[String],
) -> Result<TestReport, CommandError> {
    let project = state.initialize()?;
    if args.is_empty() {
        return Err(CommandError::usage("test", USAGE, None));
    }

    let selection = select_packages(project, args)?;
    if selection.is_empty() {
        return Err(CommandError::NoTestablePackages);
    }
    tracing::info!("Testing {} package(s)", selection.len());

    let mut report = TestReport::default();
    for selected in &selection {
        state.reset();
        let project = state.initialize()?;

        let target = resolve_target(project, TEST_TARGET_NAME).ok_or_else(|| {
            CommandError::MissingTestTarget {
                name: TEST_TARGET_NAME.to_string(),
            }
        })?;
        let builder = factory.new_builder(project, target)?;

        status_message(
            Verbosity::Default,
            format!("Testing package {}", selected.full_name),
        );

        // The selection came from an earlier generation; look it up again.
        let package = resolve_package(project, &selected.full_name).map_err(|_| {
            CommandError::ReResolution {
                name: selected.name.clone(),
            }
        })?;

        report.generations.push(project.generation());
        match builder.test(package) {
            Ok(()) => report.passed.push(selected.full_name.clone()),
            Err(e) => {
                let diagnostic = e.diagnostic();
                status_message(Verbosity::Quiet, &diagnostic);
                report.failed.push(TestOutcome {
                    package: selected.full_name.clone(),
                    diagnostic,
                });
            }
        }
    }

    if report.all_passed() {
        status_message(Verbosity::Default, report.passed_line());
        status_message(Verbosity::Default, "All tests passed");
        Ok(report)
    } else {
        Err(CommandError::TestFailures(report))
    }
}

fn select_packages(project: &Project, args: &[String]) -> Result<Vec<Selected>, CommandError> {
    let mut test_all = false;
    let mut selection = Vec::new();

    for arg in args {
        if arg == KEYWORD_ALL {
            test_all = true;
        } else {
            let package = resolve_package(project, arg)?;
            selection.push(Selected {
                full_name: package.full_name().to_string(),
                name: package.name().to_string(),
            });
        }
    }

    if test_all {
        selection = project
            .packages()
            .filter(|package| package.is_testable())
            .map(|package| Selected {
                full_name: package.full_name().to_string(),
                name: package.name().to_string(),
            })
            .collect();
    }

    Ok(selection)
}
