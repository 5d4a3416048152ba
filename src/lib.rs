//! tinbuild - firmware build tool for embedded targets
//!
//! Builds, tests, loads and debugs firmware images defined by a project of
//! packages and targets.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Project model, name resolution and action orchestration
//! - [`infra`] - Infrastructure layer (filesystem, processes, directories)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
