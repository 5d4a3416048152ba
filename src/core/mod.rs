//! Core business logic module
//!
//! External processes and filesystem access go through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`manifest`] - Manifest (project.toml, target.toml, pkg.toml) parsing
//! - [`project`] - Project model and project state lifecycle
//! - [`resolver`] - Target and package name resolution
//! - [`builder`] - Builder lifecycle and the command-running builder
//! - [`build_env`] - Environment passed to toolchain commands
//! - [`dispatch`] - Single-target actions and clean
//! - [`test_runner`] - Batch package testing with per-package reset
//! - [`global_config`] - Global configuration management

pub mod build_env;
pub mod builder;
pub mod dispatch;
pub mod global_config;
pub mod manifest;
pub mod project;
pub mod resolver;
pub mod test_runner;
