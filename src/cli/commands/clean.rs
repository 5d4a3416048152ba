//! CLI implementation for `tinbuild clean`

use anyhow::Result;

use crate::cli::output::{status_message, Verbosity};
use crate::core::builder::BuilderFactory;
use crate::core::dispatch;
use crate::core::project::ProjectState;

/// Execute the clean command
pub fn execute(
    state: &mut ProjectState,
    factory: &dyn BuilderFactory,
    targets: &[String],
) -> Result<()> {
    let summary = dispatch::clean(state, factory, targets)?;

    for target in &summary.cleaned {
        status_message(Verbosity::Verbose, format!("Cleaned target {target}"));
    }

    Ok(())
}
