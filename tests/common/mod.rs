//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Shell toolchain standing in for a cross compiler and flasher
///
/// `build` writes the app image, `test` fails when the package directory
/// contains a `FAIL` marker.
pub const NATIVE_TOOLCHAIN: &str = r#"[toolchain]
build = 'mkdir -p "$(dirname "$TINBUILD_ELF")" && echo "elf for $TINBUILD_APP on $TINBUILD_BSP" > "$TINBUILD_ELF"'
test = 'if [ -f "$TINBUILD_PACKAGE_DIR/FAIL" ]; then echo "assertion failed in $TINBUILD_PACKAGE"; exit 1; fi; echo "ok $TINBUILD_PACKAGE"'
load = 'echo "loading $TINBUILD_ELF"'
debug = 'echo "debugging $TINBUILD_TARGET"'
size = 'echo "   text    data     bss"; wc -c < "$TINBUILD_ELF"'
"#;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create an empty test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Project with the native toolchain, an app, a bsp and the targets
    /// `blinky` and `unittest`
    pub fn native() -> Self {
        let project = Self::new();
        project.create_file(
            "project.toml",
            &format!("[project]\nname = \"demo\"\n\n{NATIVE_TOOLCHAIN}"),
        );
        project.add_package("apps/blinky", false);
        project.add_package("hw/bsp/native", false);
        project.add_target("blinky", "apps/blinky", "hw/bsp/native");
        project.add_target("unittest", "apps/blinky", "hw/bsp/native");
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Add a package, with a test directory when `testable`
    pub fn add_package(&self, path: &str, testable: bool) {
        self.create_file(&format!("{path}/pkg.toml"), "[pkg]\n");
        if testable {
            self.create_dir(&format!("{path}/src/test"));
        }
    }

    /// Add a target definition
    pub fn add_target(&self, name: &str, app: &str, bsp: &str) {
        self.create_file(
            &format!("targets/{name}/target.toml"),
            &format!("[target]\napp = \"{app}\"\nbsp = \"{bsp}\"\n"),
        );
    }

    /// Make the test command fail for package `path`
    pub fn mark_failing(&self, path: &str) {
        self.create_file(&format!("{path}/FAIL"), "");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Run tinbuild with `args` from the project root
    pub fn run(&self, args: &[&str]) -> Output {
        self.run_in(self.dir.path(), args)
    }

    /// Run tinbuild with `args` from `dir`
    ///
    /// The global config directory points into the project so the user's
    /// own config never leaks into tests.
    pub fn run_in(&self, dir: &Path, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tinbuild"))
            .current_dir(dir)
            .args(args)
            .env("TINBUILD_CONFIG_DIR", self.dir.path().join(".config"))
            .env_remove("TINBUILD_PROJECT_DIR")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute tinbuild")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Captured stdout as text
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Captured stderr as text
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
