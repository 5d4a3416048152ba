//! Target subcommand implementations

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::json_mode;
use crate::core::project::ProjectState;

#[derive(Serialize)]
struct TargetInfo<'a> {
    name: &'a str,
    app: &'a str,
    bsp: &'a str,
    build_profile: &'a str,
}

/// Execute the target list command
pub fn execute_list(state: &mut ProjectState) -> Result<()> {
    let project = state.initialize()?;

    let targets: Vec<TargetInfo> = project
        .targets()
        .values()
        .map(|target| TargetInfo {
            name: target.name(),
            app: target.app(),
            bsp: target.bsp(),
            build_profile: target.build_profile(),
        })
        .collect();

    if json_mode() {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    if targets.is_empty() {
        println!("No targets defined.");
        return Ok(());
    }

    for target in &targets {
        println!("  {}", target.name);
        println!("    app: {}", target.app);
        println!("    bsp: {}", target.bsp);
        println!("    build_profile: {}", target.build_profile);
    }
    println!();
    println!("{} target(s).", targets.len());

    Ok(())
}
