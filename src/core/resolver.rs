//! Name resolution
//!
//! Maps user-supplied names to targets and packages of one loaded project
//! generation. Lookups never mutate the project.

use crate::config::defaults::{LOCAL_REPO, TARGETS_DIR};
use crate::core::project::{Package, Project, Target};
use crate::error::ResolveError;

/// Look up a target by name
///
/// Accepts both `name` and the path form `targets/name`. Returns `None`
/// rather than an error; callers decide how to report it.
pub fn resolve_target<'p>(project: &'p Project, name: &str) -> Option<&'p Target> {
    let name = name.trim_end_matches('/');
    let key = name
        .strip_prefix(TARGETS_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(name);
    project.targets().get(key)
}

/// Look up a package by name
///
/// - `@repo/path` looks only in repository `repo` (`@local/path` is the project itself)
/// - a bare `path` prefers the local repository, then searches the others and
///   must match exactly one package
pub fn resolve_package<'p>(project: &'p Project, name: &str) -> Result<&'p Package, ResolveError> {
    let trimmed = name.trim_end_matches('/');
    let not_found = || ResolveError::PackageNotFound {
        name: name.to_string(),
    };

    if trimmed.is_empty() {
        return Err(not_found());
    }

    if let Some(qualified) = trimmed.strip_prefix('@') {
        let (repo, path) = qualified.split_once('/').ok_or_else(not_found)?;
        let packages = project
            .package_list()
            .get(repo)
            .ok_or_else(|| ResolveError::UnknownRepository {
                repo: repo.to_string(),
                name: name.to_string(),
            })?;
        return packages.get(path).ok_or_else(not_found);
    }

    if let Some(package) = project
        .package_list()
        .get(LOCAL_REPO)
        .and_then(|packages| packages.get(trimmed))
    {
        return Ok(package);
    }

    let mut candidates: Vec<&Package> = project
        .package_list()
        .values()
        .filter_map(|packages| packages.get(trimmed))
        .collect();

    match candidates.len() {
        0 => Err(not_found()),
        1 => Ok(candidates.remove(0)),
        _ => Err(ResolveError::Ambiguous {
            name: name.to_string(),
            candidates: candidates
                .iter()
                .map(|package| package.full_name().to_string())
                .collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::ProjectState;
    use crate::test_utils::fixtures::ProjectFixture;
    use crate::test_utils::generators::package_path;
    use proptest::prelude::*;

    fn fixture() -> ProjectFixture {
        ProjectFixture::new()
            .with_repository("core", "repos/core")
            .with_repository("nordic", "repos/nordic")
            .with_native_target("blinky")
            .with_package("libs/os", true)
            .with_repo_package("core", "libs/os", true)
            .with_repo_package("core", "hw/hal", false)
            .with_repo_package("nordic", "hw/hal", false)
            .with_repo_package("nordic", "hw/mcu/nrf52", false)
    }

    #[test]
    fn test_resolve_target_by_name_and_path() {
        let fixture = fixture();
        let mut state = ProjectState::new(fixture.path());
        let project = state.initialize().unwrap();

        assert_eq!(resolve_target(project, "blinky").unwrap().name(), "blinky");
        assert_eq!(resolve_target(project, "targets/blinky").unwrap().name(), "blinky");
        assert!(resolve_target(project, "nope").is_none());
        assert!(resolve_target(project, "targets").is_none());
    }

    #[test]
    fn test_bare_name_prefers_local_repository() {
        let fixture = fixture();
        let mut state = ProjectState::new(fixture.path());
        let project = state.initialize().unwrap();

        let package = resolve_package(project, "libs/os").unwrap();

        assert_eq!(package.repo(), "local");
        assert_eq!(package.full_name(), "libs/os");
    }

    #[test]
    fn test_qualified_name_selects_repository() {
        let fixture = fixture();
        let mut state = ProjectState::new(fixture.path());
        let project = state.initialize().unwrap();

        let package = resolve_package(project, "@core/libs/os").unwrap();
        assert_eq!(package.repo(), "core");
        assert_eq!(package.full_name(), "@core/libs/os");

        let local = resolve_package(project, "@local/libs/os").unwrap();
        assert_eq!(local.repo(), "local");
    }

    #[test]
    fn test_bare_name_unique_in_other_repository() {
        let fixture = fixture();
        let mut state = ProjectState::new(fixture.path());
        let project = state.initialize().unwrap();

        let package = resolve_package(project, "hw/mcu/nrf52").unwrap();

        assert_eq!(package.full_name(), "@nordic/hw/mcu/nrf52");
    }

    #[test]
    fn test_bare_name_in_several_repositories_is_ambiguous() {
        let fixture = fixture();
        let mut state = ProjectState::new(fixture.path());
        let project = state.initialize().unwrap();

        let err = resolve_package(project, "hw/hal").unwrap_err();

        assert_eq!(
            err,
            ResolveError::Ambiguous {
                name: "hw/hal".to_string(),
                candidates: vec!["@core/hw/hal".to_string(), "@nordic/hw/hal".to_string()],
            }
        );
    }

    #[test]
    fn test_unknown_names() {
        let fixture = fixture();
        let mut state = ProjectState::new(fixture.path());
        let project = state.initialize().unwrap();

        assert!(matches!(
            resolve_package(project, "libs/missing"),
            Err(ResolveError::PackageNotFound { .. })
        ));
        assert!(matches!(
            resolve_package(project, "@vendor/libs/os"),
            Err(ResolveError::UnknownRepository { .. })
        ));
        assert!(matches!(
            resolve_package(project, "@core"),
            Err(ResolveError::PackageNotFound { .. })
        ));
        assert!(matches!(
            resolve_package(project, ""),
            Err(ResolveError::PackageNotFound { .. })
        ));
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let fixture = fixture();
        let mut state = ProjectState::new(fixture.path());
        let project = state.initialize().unwrap();

        assert_eq!(resolve_package(project, "libs/os/").unwrap().full_name(), "libs/os");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_full_name_resolves_to_same_package(
            local in package_path(),
            remote in package_path(),
        ) {
            let fixture = ProjectFixture::new()
                .with_repository("core", "repos/core")
                .with_package(&local, false)
                .with_repo_package("core", &remote, false);
            let mut state = ProjectState::new(fixture.path());
            let project = state.initialize().unwrap();

            for package in project.packages() {
                let resolved = resolve_package(project, package.full_name()).unwrap();
                prop_assert_eq!(resolved, package);
            }
        }
    }
}
