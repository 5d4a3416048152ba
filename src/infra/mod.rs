//! Infrastructure layer
//!
//! Handles I/O operations: filesystem, platform directories and external
//! processes.

pub mod dirs;
pub mod filesystem;
pub mod shell;
