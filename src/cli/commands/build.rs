//! CLI implementation for `tinbuild build`

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::json_mode;
use crate::core::builder::BuilderFactory;
use crate::core::dispatch::{run_action, TargetAction};
use crate::core::project::ProjectState;

#[derive(Serialize)]
struct BuildOutput<'a> {
    target: &'a str,
    app_image: String,
}

/// Execute the build command
pub fn execute(
    state: &mut ProjectState,
    factory: &dyn BuilderFactory,
    targets: &[String],
) -> Result<()> {
    let elf = run_action(state, factory, TargetAction::Build, targets)?;

    if json_mode() {
        let output = BuildOutput {
            target: targets.first().map_or("", String::as_str),
            app_image: elf.display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
