//! Action environment setup
//!
//! Environment variables handed to every toolchain command, so build, test,
//! load, debug and size scripts can find the target's inputs and outputs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::project::{Package, Target};

/// Environment for one builder action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEnvironment {
    /// Project root directory
    pub project_root: PathBuf,
    /// Target name
    pub target: String,
    /// Application package name
    pub app: String,
    /// Board support package name
    pub bsp: String,
    /// Build profile
    pub profile: String,
    /// Output directory of the target (`bin/<target>`)
    pub bin_dir: PathBuf,
    /// App image path
    pub elf: PathBuf,
    /// Number of parallel jobs
    pub jobs: usize,
    /// Package under test, only set for test actions
    pub package: Option<PackageEnvironment>,
}

/// Package-specific part of a test action environment
#[derive(Debug, Clone, PartialEq)]
pub struct PackageEnvironment {
    /// Fully qualified package name
    pub name: String,
    /// Package base path
    pub dir: PathBuf,
    /// Output directory for this package's test build
    pub test_dir: PathBuf,
}

impl ActionEnvironment {
    /// Environment for `target` with outputs under `bin_dir`
    pub fn for_target(project_root: &Path, target: &Target, bin_dir: PathBuf, elf: PathBuf) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            target: target.name().to_string(),
            app: target.app().to_string(),
            bsp: target.bsp().to_string(),
            profile: target.build_profile().to_string(),
            bin_dir,
            elf,
            jobs: num_cpus::get(),
            package: None,
        }
    }

    /// Add the package under test
    #[must_use]
    pub fn with_package(mut self, package: &Package, test_dir: PathBuf) -> Self {
        self.package = Some(PackageEnvironment {
            name: package.full_name().to_string(),
            dir: package.base_path().to_path_buf(),
            test_dir,
        });
        self
    }

    /// Convert to environment variable map for process execution
    pub fn to_env_map(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert(
            "TINBUILD_PROJECT_ROOT".to_string(),
            self.project_root.display().to_string(),
        );
        env.insert("TINBUILD_TARGET".to_string(), self.target.clone());
        env.insert("TINBUILD_APP".to_string(), self.app.clone());
        env.insert("TINBUILD_BSP".to_string(), self.bsp.clone());
        env.insert("TINBUILD_PROFILE".to_string(), self.profile.clone());
        env.insert(
            "TINBUILD_BIN_DIR".to_string(),
            self.bin_dir.display().to_string(),
        );
        env.insert("TINBUILD_ELF".to_string(), self.elf.display().to_string());
        env.insert("TINBUILD_JOBS".to_string(), self.jobs.to_string());

        if let Some(ref package) = self.package {
            env.insert("TINBUILD_PACKAGE".to_string(), package.name.clone());
            env.insert(
                "TINBUILD_PACKAGE_DIR".to_string(),
                package.dir.display().to_string(),
            );
            env.insert(
                "TINBUILD_TEST_DIR".to_string(),
                package.test_dir.display().to_string(),
            );
        }

        env
    }
}
