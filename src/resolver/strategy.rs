//! Manifest resolution strategies for link sources.
//!
//! A link's `src` is resolved by an ordered list of strategies. Each strategy
//! produces candidate paths; the first candidate that holds a loadable
//! manifest wins. Every candidate tried is recorded so an unresolved link can
//! report exactly where it was looked for.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::manifest::{resolve_manifest_file, LoadedManifest, ManifestLoader};

/// Directory searched for named packages, walking up from the referencing
/// manifest's directory.
pub const PACKAGES_DIR: &str = "cpp_modules";

/// How a link source is turned into manifest candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// `src` is a path relative to the referencing target's directory
    Relative,
    /// `src` is a package name looked up in `cpp_modules` directories and
    /// configured search paths
    SearchPath,
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStrategy::Relative => write!(f, "relative"),
            ResolutionStrategy::SearchPath => write!(f, "search-path"),
        }
    }
}

/// Record of one strategy's attempt.
#[derive(Debug, Clone)]
pub struct ResolutionAttempt {
    pub strategy: ResolutionStrategy,
    pub candidates: Vec<PathBuf>,
    pub outcome: String,
}

impl fmt::Display for ResolutionAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.candidates.is_empty() {
            return write!(f, "{}: no candidates ({})", self.strategy, self.outcome);
        }
        let candidates: Vec<_> = self
            .candidates
            .iter()
            .map(|c| c.display().to_string())
            .collect();
        write!(
            f,
            "{}: tried {} ({})",
            self.strategy,
            candidates.join(", "),
            self.outcome
        )
    }
}

/// A manifest found by a strategy.
#[derive(Debug)]
pub struct Located {
    pub manifest: LoadedManifest,
    pub path: PathBuf,
    pub strategy: ResolutionStrategy,
}

/// Locates the manifest a link source refers to.
#[derive(Debug, Clone)]
pub struct ManifestLocator {
    strategies: Vec<ResolutionStrategy>,
    search_paths: Vec<PathBuf>,
}

impl Default for ManifestLocator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ManifestLocator {
    /// Create a locator with the default strategy order and extra search paths.
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        ManifestLocator {
            strategies: vec![ResolutionStrategy::Relative, ResolutionStrategy::SearchPath],
            search_paths,
        }
    }

    /// Replace the strategy order.
    pub fn with_strategies(mut self, strategies: Vec<ResolutionStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Strategies in the order they are tried.
    pub fn strategies(&self) -> &[ResolutionStrategy] {
        &self.strategies
    }

    /// Candidate paths a strategy proposes for `src`.
    pub fn candidates(
        &self,
        strategy: ResolutionStrategy,
        src: &str,
        context_dir: &Path,
    ) -> Vec<PathBuf> {
        let src_path = Path::new(src);
        match strategy {
            ResolutionStrategy::Relative => {
                vec![crate::util::fs::absolutize(context_dir, src_path)]
            }
            ResolutionStrategy::SearchPath => {
                if src_path.is_absolute() {
                    return Vec::new();
                }
                context_dir
                    .ancestors()
                    .map(|dir| dir.join(PACKAGES_DIR).join(src_path))
                    .chain(self.search_paths.iter().map(|dir| dir.join(src_path)))
                    .collect()
            }
        }
    }

    /// Try every strategy in order and load the first manifest found.
    ///
    /// A candidate that exists but fails to load is recorded and the search
    /// moves on. On failure, returns every attempt made.
    pub fn locate(
        &self,
        loader: &mut ManifestLoader,
        src: &str,
        context_dir: &Path,
    ) -> Result<Located, Vec<ResolutionAttempt>> {
        let mut attempts = Vec::new();

        for &strategy in &self.strategies {
            let candidates = self.candidates(strategy, src, context_dir);
            let mut outcome = "not found".to_string();

            for candidate in &candidates {
                let Some(path) = resolve_manifest_file(candidate) else {
                    continue;
                };

                match loader.load(&path, None) {
                    Ok(manifest) => {
                        tracing::debug!(
                            "resolved `{}` via {} strategy: {}",
                            src,
                            strategy,
                            path.display()
                        );
                        return Ok(Located {
                            manifest,
                            path,
                            strategy,
                        });
                    }
                    Err(e) => {
                        tracing::debug!("candidate {} failed to load: {}", path.display(), e);
                        outcome = e.to_string();
                    }
                }
            }

            attempts.push(ResolutionAttempt {
                strategy,
                candidates,
                outcome,
            });
        }

        Err(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestProject;

    #[test]
    fn test_relative_candidates() {
        let locator = ManifestLocator::default();
        let candidates = locator.candidates(
            ResolutionStrategy::Relative,
            "../zlib",
            Path::new("/proj/app"),
        );
        assert_eq!(candidates, vec![PathBuf::from("/proj/zlib")]);
    }

    #[test]
    fn test_search_path_candidates_walk_up() {
        let locator = ManifestLocator::new(vec![PathBuf::from("/opt/cpp")]);
        let candidates =
            locator.candidates(ResolutionStrategy::SearchPath, "fmt", Path::new("/proj/app"));

        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/proj/app/cpp_modules/fmt"),
                PathBuf::from("/proj/cpp_modules/fmt"),
                PathBuf::from("/cpp_modules/fmt"),
                PathBuf::from("/opt/cpp/fmt"),
            ]
        );
    }

    #[test]
    fn test_named_package_found_in_ancestor_modules() {
        let project = TestProject::new()
            .manifest("cpp_modules/fmt/CppBuild.toml", "name = \"fmt\"\n")
            .manifest("app/CppBuild.toml", "name = \"app\"\n");

        let locator = ManifestLocator::default();
        let mut loader = ManifestLoader::new();
        let located = locator
            .locate(&mut loader, "fmt", &project.path("app"))
            .unwrap();

        assert_eq!(located.strategy, ResolutionStrategy::SearchPath);
        assert_eq!(located.path, project.path("cpp_modules/fmt/CppBuild.toml"));
    }

    #[test]
    fn test_failed_lookup_reports_every_strategy() {
        let project = TestProject::new();
        let locator = ManifestLocator::default();
        let mut loader = ManifestLoader::new();

        let attempts = locator
            .locate(&mut loader, "missing", project.root())
            .unwrap_err();

        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].strategy, ResolutionStrategy::Relative);
        assert_eq!(attempts[1].strategy, ResolutionStrategy::SearchPath);
        assert!(attempts[0].to_string().starts_with("relative: tried"));
    }

    #[test]
    fn test_broken_candidate_falls_through() {
        let project = TestProject::new()
            .manifest("zlib/CppBuild.toml", "this is not toml = = =")
            .manifest("cpp_modules/zlib/CppBuild.toml", "name = \"zlib\"\n");

        let locator = ManifestLocator::default();
        let mut loader = ManifestLoader::new();
        let located = locator.locate(&mut loader, "zlib", project.root()).unwrap();

        assert_eq!(located.strategy, ResolutionStrategy::SearchPath);
    }

    #[test]
    fn test_strategy_order_is_configurable() {
        let project = TestProject::new()
            .manifest("zlib/CppBuild.toml", "name = \"zlib\"\n")
            .manifest("cpp_modules/zlib/CppBuild.toml", "name = \"zlib\"\n");

        let locator = ManifestLocator::default().with_strategies(vec![
            ResolutionStrategy::SearchPath,
            ResolutionStrategy::Relative,
        ]);
        let mut loader = ManifestLoader::new();
        let located = locator.locate(&mut loader, "zlib", project.root()).unwrap();

        assert_eq!(locator.strategies()[0], ResolutionStrategy::SearchPath);
        assert_eq!(located.path, project.path("cpp_modules/zlib/CppBuild.toml"));
    }
}
