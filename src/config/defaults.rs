//! Default configuration values

/// Project manifest file name, found at the project root
pub const PROJECT_MANIFEST: &str = "project.toml";

/// Target manifest file name, one per `targets/<name>/` directory
pub const TARGET_MANIFEST: &str = "target.toml";

/// Package manifest file name, marks a package base directory
pub const PACKAGE_MANIFEST: &str = "pkg.toml";

/// Directory holding target definitions
pub const TARGETS_DIR: &str = "targets";

/// Root of all build output (`BinRoot`)
pub const BIN_DIR: &str = "bin";

/// Repository id of the project itself
pub const LOCAL_REPO: &str = "local";

/// Reserved target used for every package test cycle
pub const TEST_TARGET_NAME: &str = "unittest";

/// Wildcard accepted by `clean` and `test`
pub const KEYWORD_ALL: &str = "all";

/// Subdirectory of a package base path that makes it testable
pub const TEST_SOURCE_DIR: &str = "src/test";

/// Build profile used when a target does not name one
pub const DEFAULT_BUILD_PROFILE: &str = "default";

/// Environment variable selecting the project directory
pub const ENV_PROJECT_DIR: &str = "TINBUILD_PROJECT_DIR";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
