//! Test utilities
//!
//! Proptest generators, an on-disk project fixture and a recording builder
//! factory for exercising the orchestration code without real toolchains.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate one path segment of a package name
    pub fn path_segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,8}"
    }

    /// Generate a slash-separated package path such as `libs/os`
    pub fn package_path() -> impl Strategy<Value = String> {
        prop::collection::vec(path_segment(), 1..=3).prop_map(|segments| segments.join("/"))
    }

    /// Generate a target name
    pub fn target_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,12}".prop_filter("reserved names", |s| s != "all" && s != "targets")
    }
}

#[cfg(test)]
pub mod fixtures {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::rc::Rc;

    use tempfile::TempDir;

    use crate::config::defaults::{
        PACKAGE_MANIFEST, PROJECT_MANIFEST, TARGETS_DIR, TARGET_MANIFEST, TEST_SOURCE_DIR,
    };
    use crate::core::builder::{bin_root, Action, Builder, BuilderFactory};
    use crate::core::project::{Package, Project, Target};
    use crate::error::BuildError;

    /// Toolchain commands that fake a real build with plain shell
    ///
    /// `build` writes the image, `test` fails when the package directory
    /// holds a `FAIL` marker.
    pub const NATIVE_TOOLCHAIN: &str = r#"build = 'mkdir -p "$(dirname "$TINBUILD_ELF")" && echo elf > "$TINBUILD_ELF"'
test = 'if [ -f "$TINBUILD_PACKAGE_DIR/FAIL" ]; then echo "assertion failed in $TINBUILD_PACKAGE"; exit 1; fi'
load = 'echo "loading $TINBUILD_ELF"'
debug = 'echo "debugging $TINBUILD_TARGET"'
size = 'wc -c < "$TINBUILD_ELF"'
"#;

    /// Temporary project directory with builder-style setup
    pub struct ProjectFixture {
        dir: TempDir,
        repositories: BTreeMap<String, String>,
        toolchain: String,
    }

    impl ProjectFixture {
        /// Empty project with the native toolchain
        pub fn new() -> Self {
            let fixture = Self {
                dir: TempDir::new().expect("Failed to create temp directory"),
                repositories: BTreeMap::new(),
                toolchain: NATIVE_TOOLCHAIN.to_string(),
            };
            fixture.write_manifest();
            fixture
        }

        /// Root directory of the project
        pub fn path(&self) -> PathBuf {
            self.dir.path().to_path_buf()
        }

        /// Declare repository `id` at `rel_path` and create its directory
        #[must_use]
        pub fn with_repository(mut self, id: &str, rel_path: &str) -> Self {
            self.create_dir(rel_path);
            self.repositories
                .insert(id.to_string(), rel_path.to_string());
            self.write_manifest();
            self
        }

        /// Add a local package
        #[must_use]
        pub fn with_package(self, path: &str, testable: bool) -> Self {
            self.add_package(path, testable);
            self
        }

        /// Add a package to repository `repo`
        #[must_use]
        pub fn with_repo_package(self, repo: &str, path: &str, testable: bool) -> Self {
            let base = self
                .repositories
                .get(repo)
                .unwrap_or_else(|| panic!("repository '{repo}' not declared"));
            self.add_package(&format!("{base}/{path}"), testable);
            self
        }

        /// Add target `name` building `apps/blinky` for `hw/bsp/native`
        #[must_use]
        pub fn with_native_target(self, name: &str) -> Self {
            if !self.dir.path().join("apps/blinky").join(PACKAGE_MANIFEST).exists() {
                self.add_package("apps/blinky", false);
            }
            if !self.dir.path().join("hw/bsp/native").join(PACKAGE_MANIFEST).exists() {
                self.add_package("hw/bsp/native", false);
            }
            self.with_target(name, "apps/blinky", "hw/bsp/native")
        }

        /// Add target `name` with the given app and bsp package names
        #[must_use]
        pub fn with_target(self, name: &str, app: &str, bsp: &str) -> Self {
            self.create_file(
                &format!("{TARGETS_DIR}/{name}/{TARGET_MANIFEST}"),
                &format!("[target]\napp = \"{app}\"\nbsp = \"{bsp}\"\n"),
            );
            self
        }

        /// Replace the project's `[toolchain]` body; empty removes the section
        #[must_use]
        pub fn with_toolchain(mut self, body: &str) -> Self {
            self.toolchain = body.to_string();
            self.write_manifest();
            self
        }

        /// Create a package directory with a manifest
        pub fn add_package(&self, path: &str, testable: bool) {
            self.create_file(&format!("{path}/{PACKAGE_MANIFEST}"), "[pkg]\n");
            if testable {
                self.create_dir(&format!("{path}/{TEST_SOURCE_DIR}"));
            }
        }

        /// Make the native test command fail for local package `path`
        pub fn mark_failing(&self, path: &str) {
            self.create_file(&format!("{path}/FAIL"), "");
        }

        /// Create a file, including parent directories
        pub fn create_file(&self, name: &str, content: &str) {
            let path = self.dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create parent directories");
            }
            std::fs::write(path, content).expect("Failed to write file");
        }

        /// Create a directory, including parents
        pub fn create_dir(&self, name: &str) {
            std::fs::create_dir_all(self.dir.path().join(name))
                .expect("Failed to create directory");
        }

        fn write_manifest(&self) {
            let mut manifest = String::from("[project]\nname = \"fixture\"\n");
            if !self.repositories.is_empty() {
                manifest.push_str("\n[repositories]\n");
                for (id, path) in &self.repositories {
                    manifest.push_str(&format!("{id} = \"{path}\"\n"));
                }
            }
            if !self.toolchain.is_empty() {
                manifest.push_str("\n[toolchain]\n");
                manifest.push_str(&self.toolchain);
            }
            self.create_file(PROJECT_MANIFEST, &manifest);
        }
    }

    impl Default for ProjectFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    /// One interaction with a fake builder
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        NewBuilder { target: String, generation: u64 },
        Action { action: Action, target: String },
        Test { package: String, generation: u64 },
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        remove_after_test: Option<PathBuf>,
    }

    /// Builder factory that records every call instead of running commands
    #[derive(Default)]
    pub struct FakeFactory {
        recorder: Rc<RefCell<Recorder>>,
        failing_packages: Vec<String>,
        failing_actions: Vec<Action>,
        refuse: bool,
    }

    impl FakeFactory {
        /// Factory whose test action fails for the given full package names
        pub fn failing(packages: &[&str]) -> Self {
            Self {
                failing_packages: packages.iter().map(ToString::to_string).collect(),
                ..Self::default()
            }
        }

        /// Factory whose builders fail `action`
        pub fn failing_action(action: Action) -> Self {
            Self {
                failing_actions: vec![action],
                ..Self::default()
            }
        }

        /// Factory that cannot construct builders
        pub fn refusing_construction() -> Self {
            Self {
                refuse: true,
                ..Self::default()
            }
        }

        /// Delete `dir` from disk after the first test action
        #[must_use]
        pub fn removing_after_test(self, dir: PathBuf) -> Self {
            self.recorder.borrow_mut().remove_after_test = Some(dir);
            self
        }

        /// Every recorded call in order
        pub fn calls(&self) -> Vec<Call> {
            self.recorder.borrow().calls.clone()
        }

        /// Full names of tested packages in order
        pub fn tested(&self) -> Vec<String> {
            self.recorder
                .borrow()
                .calls
                .iter()
                .filter_map(|call| match call {
                    Call::Test { package, .. } => Some(package.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Targets a lifecycle action ran for, in order
        pub fn actions(&self, action: Action) -> Vec<String> {
            self.recorder
                .borrow()
                .calls
                .iter()
                .filter_map(|call| match call {
                    Call::Action { action: a, target } if *a == action => Some(target.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl BuilderFactory for FakeFactory {
        fn new_builder<'p>(
            &self,
            project: &'p Project,
            target: &'p Target,
        ) -> Result<Box<dyn Builder + 'p>, BuildError> {
            self.recorder.borrow_mut().calls.push(Call::NewBuilder {
                target: target.name().to_string(),
                generation: project.generation(),
            });
            if self.refuse {
                return Err(BuildError::InvalidTarget {
                    target: target.name().to_string(),
                    reason: "refused by fake factory".to_string(),
                });
            }
            Ok(Box::new(FakeBuilder {
                recorder: Rc::clone(&self.recorder),
                failing_packages: self.failing_packages.clone(),
                failing_actions: self.failing_actions.clone(),
                target: target.name().to_string(),
                elf: bin_root(project.root())
                    .join(target.name())
                    .join("app/fake.elf"),
            }))
        }
    }

    struct FakeBuilder {
        recorder: Rc<RefCell<Recorder>>,
        failing_packages: Vec<String>,
        failing_actions: Vec<Action>,
        target: String,
        elf: PathBuf,
    }

    impl FakeBuilder {
        fn action(&self, action: Action) -> Result<(), BuildError> {
            self.recorder.borrow_mut().calls.push(Call::Action {
                action,
                target: self.target.clone(),
            });
            if self.failing_actions.contains(&action) {
                return Err(BuildError::ActionFailed {
                    action,
                    target: self.target.clone(),
                    status: "exit status: 1".to_string(),
                    diagnostic: format!("fake {action} error"),
                });
            }
            Ok(())
        }
    }

    impl Builder for FakeBuilder {
        fn build(&self) -> Result<(), BuildError> {
            self.action(Action::Build)
        }

        fn clean(&self) -> Result<(), BuildError> {
            self.action(Action::Clean)
        }

        fn test(&self, package: &Package) -> Result<(), BuildError> {
            let mut recorder = self.recorder.borrow_mut();
            recorder.calls.push(Call::Test {
                package: package.full_name().to_string(),
                generation: package.generation(),
            });
            if let Some(dir) = recorder.remove_after_test.take() {
                std::fs::remove_dir_all(&dir).expect("Failed to remove package");
            }
            if self.failing_packages.iter().any(|p| p == package.full_name()) {
                return Err(BuildError::TestFailed {
                    package: package.full_name().to_string(),
                    status: "exit status: 1".to_string(),
                    diagnostic: format!("assertion failed in {}", package.full_name()),
                });
            }
            Ok(())
        }

        fn load(&self) -> Result<(), BuildError> {
            self.action(Action::Load)
        }

        fn debug(&self) -> Result<(), BuildError> {
            self.action(Action::Debug)
        }

        fn size(&self) -> Result<(), BuildError> {
            self.action(Action::Size)
        }

        fn app_elf_path(&self) -> PathBuf {
            self.elf.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_package_path_generator(path in package_path()) {
            prop_assert!(!path.is_empty());
            prop_assert!(!path.starts_with('/') && !path.ends_with('/'));
            prop_assert!(path.split('/').count() <= 3);
        }

        #[test]
        fn test_target_name_generator(name in target_name()) {
            prop_assert!(name != "all");
            prop_assert!(name.chars().next().is_some_and(|c| c.is_ascii_lowercase()));
        }
    }
}
