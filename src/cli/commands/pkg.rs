//! Package subcommand implementations

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::json_mode;
use crate::core::project::ProjectState;

#[derive(Serialize)]
struct PackageInfo<'a> {
    name: &'a str,
    repository: &'a str,
    path: String,
    testable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Execute the package list command
///
/// Packages are grouped by repository; testable ones are marked `[test]`.
pub fn execute_list(state: &mut ProjectState) -> Result<()> {
    let project = state.initialize()?;

    if json_mode() {
        let packages: Vec<PackageInfo> = project
            .packages()
            .map(|package| PackageInfo {
                name: package.full_name(),
                repository: package.repo(),
                path: package.base_path().display().to_string(),
                testable: package.is_testable(),
                description: package.description(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    println!("Packages of project '{}':", project.name());
    println!();

    let mut count = 0;
    for (repo, packages) in project.package_list() {
        if packages.is_empty() {
            continue;
        }
        match project.repositories().get(repo) {
            Some(dir) => println!("{repo} ({}):", dir.display()),
            None => println!("{repo}:"),
        }
        for package in packages.values() {
            let marker = if package.is_testable() { " [test]" } else { "" };
            match package.description() {
                Some(description) => {
                    println!("  {}{marker} - {description}", package.full_name());
                }
                None => println!("  {}{marker}", package.full_name()),
            }
            count += 1;
        }
    }

    if count == 0 {
        println!("No packages found.");
    } else {
        println!();
        println!("{count} package(s).");
    }

    Ok(())
}
