//! CLI implementation for `tinbuild load`, `tinbuild debug` and `tinbuild size`

use anyhow::Result;

use crate::core::builder::BuilderFactory;
use crate::core::dispatch::{run_action, TargetAction};
use crate::core::project::ProjectState;

/// Execute a single-target action command
pub fn execute(
    state: &mut ProjectState,
    factory: &dyn BuilderFactory,
    action: TargetAction,
    targets: &[String],
) -> Result<()> {
    run_action(state, factory, action, targets)?;
    Ok(())
}
