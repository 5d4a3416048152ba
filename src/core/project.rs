//! Project state
//!
//! [`ProjectState`] owns the currently loaded [`Project`] generation.
//! `initialize` loads a fresh generation if none is loaded; `reset` drops it.
//!
//! Every [`Target`] and [`Package`] handed out borrows the [`Project`] it was
//! loaded into, and `reset` needs `&mut ProjectState`, so an entity from one
//! generation cannot be used after the next reset. Entities also carry their
//! generation number so builders can double-check at runtime.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::defaults::{
    BIN_DIR, LOCAL_REPO, PACKAGE_MANIFEST, PROJECT_MANIFEST, TARGETS_DIR, TARGET_MANIFEST,
    TEST_SOURCE_DIR,
};
use crate::core::manifest::{PackageManifest, ProjectManifest, TargetManifest, ToolchainCommands};
use crate::error::ProjectError;

/// Packages grouped by repository id, then by package name
pub type PackageList = BTreeMap<String, BTreeMap<String, Package>>;

/// A named build configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: String,
    app: String,
    bsp: String,
    build_profile: String,
    toolchain: ToolchainCommands,
    generation: u64,
}

impl Target {
    /// Target name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Application package name
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Board support package name
    pub fn bsp(&self) -> &str {
        &self.bsp
    }

    /// Build profile
    pub fn build_profile(&self) -> &str {
        &self.build_profile
    }

    /// Effective commands: target overrides, then project and global defaults
    pub fn toolchain(&self) -> &ToolchainCommands {
        &self.toolchain
    }

    /// Project generation this target was loaded under
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A unit of source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    repo: String,
    name: String,
    full_name: String,
    base_path: PathBuf,
    description: Option<String>,
    generation: u64,
}

impl Package {
    /// Repository id
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Name within its repository
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified name: bare for the local repository, `@repo/name` otherwise
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Package directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Description from pkg.toml
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Project generation this package was loaded under
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the package ships unit tests
    pub fn is_testable(&self) -> bool {
        self.base_path.join(TEST_SOURCE_DIR).exists()
    }
}

/// Fully qualified package name
pub fn qualified_name(repo: &str, name: &str) -> String {
    if repo == LOCAL_REPO {
        name.to_string()
    } else {
        format!("@{repo}/{name}")
    }
}

/// One loaded generation of the project model
#[derive(Debug)]
pub struct Project {
    name: String,
    root: PathBuf,
    generation: u64,
    repositories: BTreeMap<String, PathBuf>,
    packages: PackageList,
    targets: BTreeMap<String, Target>,
}

impl Project {
    /// Load the project rooted at `root`
    ///
    /// `defaults` supplies commands that neither the project nor a target sets.
    pub fn load(
        root: &Path,
        generation: u64,
        defaults: &ToolchainCommands,
    ) -> Result<Self, ProjectError> {
        let manifest_path = root.join(PROJECT_MANIFEST);
        if !manifest_path.is_file() {
            return Err(ProjectError::ManifestNotFound {
                path: root.to_path_buf(),
            });
        }
        let manifest = ProjectManifest::load(&manifest_path)?;
        let toolchain = manifest.toolchain.or(defaults);

        let repositories = repository_dirs(root, &manifest)?;

        let mut packages = PackageList::new();
        for (id, dir) in &repositories {
            let nested: Vec<&Path> = repositories
                .iter()
                .filter(|(other, _)| *other != id)
                .map(|(_, path)| path.as_path())
                .collect();
            let found = scan_packages(id, dir, &nested, generation)?;
            packages.insert(id.clone(), found);
        }

        let targets = scan_targets(root, &toolchain, generation)?;

        tracing::info!(
            "Loaded project '{}' (generation {generation}): {} repositories, {} packages, {} targets",
            manifest.project.name,
            repositories.len(),
            packages.values().map(BTreeMap::len).sum::<usize>(),
            targets.len()
        );

        Ok(Self {
            name: manifest.project.name,
            root: root.to_path_buf(),
            generation,
            repositories,
            packages,
            targets,
        })
    }

    /// Project name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generation number of this load
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Repository directories by id, including `local`
    pub fn repositories(&self) -> &BTreeMap<String, PathBuf> {
        &self.repositories
    }

    /// All packages grouped by repository
    pub fn package_list(&self) -> &PackageList {
        &self.packages
    }

    /// All targets by name
    pub fn targets(&self) -> &BTreeMap<String, Target> {
        &self.targets
    }

    /// Every package in deterministic order (repository id, then name)
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values().flat_map(BTreeMap::values)
    }
}

fn repository_dirs(
    root: &Path,
    manifest: &ProjectManifest,
) -> Result<BTreeMap<String, PathBuf>, ProjectError> {
    let mut repositories = BTreeMap::new();
    repositories.insert(LOCAL_REPO.to_string(), root.to_path_buf());

    for (id, rel_path) in &manifest.repositories {
        if id == LOCAL_REPO {
            return Err(ProjectError::InvalidRepository {
                id: id.clone(),
                reason: format!("'{LOCAL_REPO}' is reserved for the project itself"),
            });
        }
        if id.is_empty() || id.contains('/') || id.starts_with('@') {
            return Err(ProjectError::InvalidRepository {
                id: id.clone(),
                reason: "repository ids must be non-empty and contain no '/' or leading '@'"
                    .to_string(),
            });
        }

        let path = root.join(rel_path);
        if !path.is_dir() {
            return Err(ProjectError::RepositoryNotFound {
                id: id.clone(),
                path,
            });
        }
        repositories.insert(id.clone(), path);
    }

    Ok(repositories)
}

/// Find every pkg.toml under `dir`
///
/// Hidden directories, the output root, target definitions and the
/// directories of other repositories are skipped.
fn scan_packages(
    repo: &str,
    dir: &Path,
    other_repos: &[&Path],
    generation: u64,
) -> Result<BTreeMap<String, Package>, ProjectError> {
    let mut packages: BTreeMap<String, Package> = BTreeMap::new();

    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                return false;
            }
            if entry.depth() == 1 && (name == BIN_DIR || name == TARGETS_DIR) {
                return false;
            }
            !other_repos.iter().any(|other| entry.path() == *other)
        });

    for entry in walker {
        let entry = entry.map_err(|e| ProjectError::ScanError {
            path: dir.to_path_buf(),
            error: e.to_string(),
        })?;
        if !entry.file_type().is_file() || entry.file_name() != PACKAGE_MANIFEST {
            continue;
        }

        let Some(base_path) = entry.path().parent() else {
            continue;
        };
        let manifest = PackageManifest::load(entry.path())?;
        let rel_name = base_path
            .strip_prefix(dir)
            .unwrap_or(base_path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let name = match manifest.pkg.name {
            Some(name) => {
                if let Err(reason) = check_package_name(&name) {
                    return Err(ProjectError::InvalidPackageName {
                        name,
                        path: entry.path().to_path_buf(),
                        reason,
                    });
                }
                name
            }
            None => rel_name,
        };
        if name.is_empty() {
            tracing::warn!(
                "Skipping unnamed package at the root of repository '{repo}': {}",
                entry.path().display()
            );
            continue;
        }

        if let Some(existing) = packages.get(&name) {
            return Err(ProjectError::DuplicatePackage {
                repo: repo.to_string(),
                name,
                first: existing.base_path.clone(),
                second: base_path.to_path_buf(),
            });
        }

        tracing::debug!("Found package {} at {}", qualified_name(repo, &name), base_path.display());
        packages.insert(
            name.clone(),
            Package {
                repo: repo.to_string(),
                full_name: qualified_name(repo, &name),
                name,
                base_path: base_path.to_path_buf(),
                description: manifest.pkg.description,
                generation,
            },
        );
    }

    Ok(packages)
}

/// Reject names that would not resolve back to the package that declares them
fn check_package_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name must not be empty");
    }
    if name.starts_with('@') {
        return Err("names starting with '@' are reserved for repository qualifiers");
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err("name must not begin or end with '/'");
    }
    if name.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err("name must not contain empty, '.' or '..' path segments");
    }
    Ok(())
}

fn scan_targets(
    root: &Path,
    project_toolchain: &ToolchainCommands,
    generation: u64,
) -> Result<BTreeMap<String, Target>, ProjectError> {
    let mut targets = BTreeMap::new();
    let targets_dir = root.join(TARGETS_DIR);
    if !targets_dir.is_dir() {
        return Ok(targets);
    }

    let entries = std::fs::read_dir(&targets_dir).map_err(|e| ProjectError::ScanError {
        path: targets_dir.clone(),
        error: e.to_string(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ProjectError::ScanError {
            path: targets_dir.clone(),
            error: e.to_string(),
        })?;
        let manifest_path = entry.path().join(TARGET_MANIFEST);
        if !manifest_path.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let manifest = TargetManifest::load(&manifest_path)?;
        targets.insert(
            name.clone(),
            Target {
                name,
                app: manifest.target.app,
                bsp: manifest.target.bsp,
                build_profile: manifest.target.build_profile,
                toolchain: manifest.toolchain.or(project_toolchain),
                generation,
            },
        );
    }

    Ok(targets)
}

/// Process-wide project state, made explicit
///
/// States: uninitialized (no current project) and initialized. Only an
/// initialized state hands out a [`Project`].
#[derive(Debug)]
pub struct ProjectState {
    root: PathBuf,
    defaults: ToolchainCommands,
    generation: u64,
    current: Option<Project>,
}

impl ProjectState {
    /// Create an uninitialized state for the project at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            defaults: ToolchainCommands::default(),
            generation: 0,
            current: None,
        }
    }

    /// Set fallback commands used when neither project nor target defines one
    #[must_use]
    pub fn with_default_commands(mut self, defaults: ToolchainCommands) -> Self {
        self.defaults = defaults;
        self
    }

    /// Find the nearest ancestor of `start` (inclusive) that holds a project.toml
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_MANIFEST).is_file())
            .map(Path::to_path_buf)
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure a project generation is loaded and return it
    ///
    /// Idempotent while initialized. After a reset this performs a full
    /// reload and bumps the generation.
    pub fn initialize(&mut self) -> Result<&Project, ProjectError> {
        let project = match self.current.take() {
            Some(project) => project,
            None => {
                let generation = self.generation + 1;
                let project = Project::load(&self.root, generation, &self.defaults)?;
                self.generation = generation;
                project
            }
        };
        Ok(self.current.insert(project))
    }

    /// Drop the current generation; the next `initialize` reloads from disk
    pub fn reset(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("Reset project state (generation {})", self.generation);
        }
    }

    /// Whether a generation is currently loaded
    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Number of the most recently loaded generation (0 before the first load)
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
