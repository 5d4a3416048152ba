//! Manifest parsing: `project.toml`, `target.toml` and `pkg.toml`
//!
//! All three files support environment variable substitution using `${VAR}`
//! syntax in string values. Substitution happens at load time, against the
//! environment tinbuild itself runs in.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::defaults::DEFAULT_BUILD_PROFILE;
use crate::core::builder::Action;
use crate::error::ProjectError;

/// The project manifest (project.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectManifest {
    /// Project section
    pub project: ProjectSection,

    /// Extra repositories: id -> path relative to the project root
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,

    /// Default action commands for every target
    #[serde(default)]
    pub toolchain: ToolchainCommands,
}

/// `[project]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectSection {
    /// Project name
    pub name: String,
}

/// Shell commands run for each builder action
///
/// Any of them may be missing; the builder reports a missing command only
/// when the corresponding action is invoked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolchainCommands {
    #[serde(default)]
    pub build: Option<String>,
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub load: Option<String>,
    #[serde(default)]
    pub debug: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl ToolchainCommands {
    /// Command configured for `action`, if any
    ///
    /// `clean` never runs a command; it only removes the target's output.
    pub fn command(&self, action: Action) -> Option<&str> {
        match action {
            Action::Build => self.build.as_deref(),
            Action::Test => self.test.as_deref(),
            Action::Load => self.load.as_deref(),
            Action::Debug => self.debug.as_deref(),
            Action::Size => self.size.as_deref(),
            Action::Clean => None,
        }
    }

    /// Fill every unset command from `fallback`
    #[must_use]
    pub fn or(&self, fallback: &Self) -> Self {
        Self {
            build: self.build.clone().or_else(|| fallback.build.clone()),
            test: self.test.clone().or_else(|| fallback.test.clone()),
            load: self.load.clone().or_else(|| fallback.load.clone()),
            debug: self.debug.clone().or_else(|| fallback.debug.clone()),
            size: self.size.clone().or_else(|| fallback.size.clone()),
        }
    }
}

/// A target manifest (targets/<name>/target.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetManifest {
    /// Target section
    pub target: TargetSection,

    /// Per-target command overrides
    #[serde(default)]
    pub toolchain: ToolchainCommands,
}

/// `[target]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetSection {
    /// Application package name
    pub app: String,

    /// Board support package name
    pub bsp: String,

    /// Build profile (debug, optimized, ...)
    #[serde(default = "default_build_profile")]
    pub build_profile: String,
}

fn default_build_profile() -> String {
    DEFAULT_BUILD_PROFILE.to_string()
}

/// A package manifest (pkg.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageManifest {
    /// Package section
    #[serde(default)]
    pub pkg: PackageSection,
}

/// `[pkg]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageSection {
    /// Package name; defaults to the path relative to its repository
    #[serde(default)]
    pub name: Option<String>,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,
}

impl ProjectManifest {
    /// Load from a file, substituting environment variables
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        load_manifest(path)
    }

    /// Parse from a TOML string without substitution
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl TargetManifest {
    /// Load from a file, substituting environment variables
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        load_manifest(path)
    }
}

impl PackageManifest {
    /// Load from a file, substituting environment variables
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        load_manifest(path)
    }
}

fn load_manifest<T>(path: &Path) -> Result<T, ProjectError>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path).map_err(|e| ProjectError::ReadError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let parse_error = |error: String| ProjectError::ParseError {
        path: path.to_path_buf(),
        error,
    };

    let mut value: toml::Value = toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
    substitute_in_value(&mut value);
    value.try_into().map_err(|e: toml::de::Error| parse_error(e.to_string()))
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    })
}

/// Substitute environment variables in a string.
///
/// Replaces `${VAR}` with the value of `VAR`, or an empty string when unset.
/// `$VAR` without braces is left alone so shell commands can still use it.
///
/// # Examples
/// ```
/// use tinbuild::core::manifest::substitute_env_vars;
///
/// std::env::set_var("TINBUILD_DOC_VAR", "arm");
/// let result = substitute_env_vars("${TINBUILD_DOC_VAR}-none-eabi-gcc $CC");
/// assert_eq!(result, "arm-none-eabi-gcc $CC");
/// std::env::remove_var("TINBUILD_DOC_VAR");
/// ```
pub fn substitute_env_vars(input: &str) -> String {
    env_var_pattern()
        .replace_all(input, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

/// Recursively substitute environment variables in a TOML value
fn substitute_in_value(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) => {
            *s = substitute_env_vars(s);
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_in_value(item);
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_in_value(v);
            }
        }
        _ => {}
    }
}
