//! Dependency resolution.
//!
//! The [`DependencyResolver`] owns the target registry for one run. It loads
//! the manifests that link entries point at, registers every target reached
//! that way, and finally merges exported properties along the link edges.
//!
//! Resolution happens in two passes:
//! 1. `register` walks links recursively and records which registered
//!    target each link entry refers to.
//! 2. `resolve_links` derives `depends_on`, schedules the registry into
//!    waves, and propagates properties wave by wave, so a dependency's bags
//!    are final before any dependent reads them.

pub mod registry;
pub mod schedule;
pub mod strategy;

pub use registry::TargetRegistry;
pub use schedule::{Schedule, Scheduler, Wave};
pub use strategy::{ManifestLocator, ResolutionAttempt, ResolutionStrategy};

use std::collections::HashSet;
use std::path::Path;

use crate::core::errors::{EngineError, EngineResult};
use crate::core::manifest::ManifestLoader;
use crate::core::property::{PropertyKind, Visibility};
use crate::core::target::{Target, TargetId, TargetKind};
use crate::generator::Generator;
use crate::util::fs::absolutize;

/// One entry of a target's link list after registration.
#[derive(Debug, Clone)]
enum LinkStep {
    Target { id: TargetId, private: bool },
    System(String),
}

/// Loads, registers, and links targets.
#[derive(Debug, Default)]
pub struct DependencyResolver {
    loader: ManifestLoader,
    locator: ManifestLocator,
    registry: TargetRegistry,
    propagated: HashSet<TargetId>,
}

impl DependencyResolver {
    /// Create a resolver that finds link sources with `locator`.
    pub fn new(locator: ManifestLocator) -> Self {
        DependencyResolver {
            locator,
            ..Default::default()
        }
    }

    /// Get the registry.
    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Consume the resolver, keeping the registry.
    pub fn into_registry(self) -> TargetRegistry {
        self.registry
    }

    /// Load the manifest at `path` and register every target it declares.
    ///
    /// Returns the ids of the declared targets, in declaration order.
    pub fn register_manifest(
        &mut self,
        path: &Path,
        search_context: Option<&Path>,
    ) -> EngineResult<Vec<TargetId>> {
        let manifest = self.loader.load(path, search_context)?;
        manifest
            .into_targets()
            .into_iter()
            .map(|target| self.register(target))
            .collect()
    }

    /// Register a target and, recursively, everything it links.
    ///
    /// Registering an identity that is already present is a no-op returning
    /// the existing id.
    pub fn register(&mut self, target: Target) -> EngineResult<TargetId> {
        let (id, new) = self.registry.insert(target);
        if !new {
            return Ok(id);
        }

        tracing::debug!("registered target `{}`", self.registry[id].name);

        for index in 0..self.registry[id].link.len() {
            let link = self.registry[id].link[index].clone();
            if !link.needs_lookup() {
                continue;
            }

            let referrer = &self.registry[id];
            let context = referrer.origin_dir().to_path_buf();
            let unresolved = |attempts| EngineError::UnresolvedDependency {
                link: link.name.clone(),
                source_script_path: link.source_script_path.clone(),
                target: referrer.name.clone(),
                manifest: referrer.origin_script_path().to_path_buf(),
                attempts,
            };

            let located = match self.locator.locate(
                &mut self.loader,
                &link.source_script_path,
                &context,
            ) {
                Ok(located) => located,
                Err(attempts) => return Err(unresolved(attempts)),
            };

            let Some(dependency) = located.manifest.find(&link.name).cloned() else {
                return Err(unresolved(vec![ResolutionAttempt {
                    strategy: located.strategy,
                    candidates: vec![located.path],
                    outcome: format!("manifest declares no target named `{}`", link.name),
                }]));
            };

            let dependency_id = self.register(dependency)?;
            self.registry[id].link[index].resolved = Some(dependency_id);
        }

        Ok(id)
    }

    /// Resolve link lists into dependency edges and merged properties.
    ///
    /// Every target registered since the last call has its `link` list
    /// drained: resolved entries become `depends_on` edges, system entries
    /// pass into `resolved_link` by name. Properties are then propagated in
    /// wave order from read-only snapshots of each dependency.
    ///
    /// Fails with [`EngineError::CyclicDependency`] before any property is
    /// merged if the dependency graph has a cycle.
    pub fn resolve_links(&mut self, generator: &dyn Generator) -> EngineResult<Schedule> {
        let mut plans: Vec<(TargetId, Vec<LinkStep>)> = Vec::new();

        for id in self.registry.ids().collect::<Vec<_>>() {
            if self.propagated.contains(&id) {
                continue;
            }

            let target = &mut self.registry[id];
            let steps = plan_links(target);
            target.depends_on = steps
                .iter()
                .filter_map(|step| match step {
                    LinkStep::Target { id, .. } => Some(*id),
                    LinkStep::System(_) => None,
                })
                .collect();
            plans.push((id, steps));
        }

        let schedule = Scheduler::schedule(self.registry.iter())?;

        for wave in schedule.iter() {
            for &id in wave {
                let Some(position) = plans.iter().position(|(planned, _)| *planned == id) else {
                    continue;
                };
                let (_, steps) = plans.swap_remove(position);
                self.apply(id, steps, generator);
                self.propagated.insert(id);
            }
        }

        Ok(schedule)
    }

    fn apply(&mut self, id: TargetId, steps: Vec<LinkStep>, generator: &dyn Generator) {
        for step in steps {
            match step {
                LinkStep::Target {
                    id: dependency,
                    private,
                } => {
                    let snapshot = self.registry[dependency].clone();
                    propagate(&mut self.registry[id], &snapshot, private, generator);
                }
                LinkStep::System(name) => {
                    let target = &mut self.registry[id];
                    if !target.resolved_link.contains(&name) {
                        target.resolved_link.push(name);
                    }
                }
            }
        }
        self.registry[id].link.clear();
    }
}

/// Drain a target's link entries into ordered steps, one per dependency.
fn plan_links(target: &mut Target) -> Vec<LinkStep> {
    let mut steps: Vec<LinkStep> = Vec::new();

    for link in target.link.drain(..) {
        let step = match link.resolved {
            Some(id) => LinkStep::Target {
                id,
                private: link.is_private(),
            },
            None => LinkStep::System(link.name),
        };

        let duplicate = steps.iter().any(|seen| match (seen, &step) {
            (LinkStep::Target { id: a, .. }, LinkStep::Target { id: b, .. }) => a == b,
            (LinkStep::System(a), LinkStep::System(b)) => a == b,
            _ => false,
        });
        if !duplicate {
            steps.push(step);
        }
    }

    steps
}

/// Merge `dependency`'s exported properties into `target`.
///
/// `interface ++ public` of each dependency bag lands in the target's
/// `private` scope for a private link and in `public` otherwise. Directory
/// entries are made absolute against the dependency's own manifest directory
/// first. A static library dependency also contributes its predicted archive
/// path to the target's link list.
pub fn propagate(
    target: &mut Target,
    dependency: &Target,
    private: bool,
    generator: &dyn Generator,
) {
    let scope = if private {
        Visibility::Private
    } else {
        Visibility::Public
    };

    for kind in PropertyKind::ALL {
        let mut exported = dependency.bag(kind).exported();
        if kind.is_path() {
            for entry in &mut exported {
                *entry = absolutize(dependency.origin_dir(), entry.as_str())
                    .to_string_lossy()
                    .into_owned();
            }
        }

        let flags = matches!(kind, PropertyKind::CompilerFlags | PropertyKind::LinkerFlags);
        let destination = target.bag_mut(kind).scope_mut(scope);
        for entry in exported {
            // flags may legitimately repeat (`-Xlinker a -Xlinker b`)
            if flags || !destination.contains(&entry) {
                destination.push(entry);
            }
        }
    }

    if dependency.kind == TargetKind::StaticLibrary {
        let artifact = generator
            .predict_output_path(dependency)
            .to_string_lossy()
            .into_owned();
        if !target.resolved_link.contains(&artifact) {
            target.resolved_link.push(artifact);
        }
    }

    tracing::debug!(
        "propagated `{}` into `{}` ({})",
        dependency.name,
        target.name,
        scope
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::link::LinkReference;
    use crate::core::property::PropertyBag;
    use crate::test_support::{self, RecordingGenerator, TestProject};

    fn resolve(project: &TestProject) -> (DependencyResolver, Schedule, RecordingGenerator) {
        let generator = RecordingGenerator::new(project.path("out"));
        let mut resolver = DependencyResolver::default();
        resolver
            .register_manifest(&project.path("CppBuild.toml"), None)
            .unwrap();
        let schedule = resolver.resolve_links(&generator).unwrap();
        (resolver, schedule, generator)
    }

    fn target<'a>(resolver: &'a DependencyResolver, name: &str) -> &'a Target {
        let id = resolver.registry().find_by_name(name).unwrap();
        &resolver.registry()[id]
    }

    #[test]
    fn test_public_include_propagates_absolute() {
        let project = test_support::lib_and_app();
        let (resolver, _, generator) = resolve(&project);

        let app = target(&resolver, "App");
        let include = project.path("include").to_string_lossy().into_owned();
        assert_eq!(app.include_directories.public, vec![include]);

        let liba = target(&resolver, "LibA");
        let archive = generator.predict_output_path(liba);
        assert_eq!(app.resolved_link, vec![archive.to_string_lossy().into_owned()]);
        assert!(app.link.is_empty());
        assert_eq!(app.depends_on.len(), 1);
    }

    #[test]
    fn test_private_link_lands_in_private_scope() {
        let project = TestProject::new().manifest(
            "CppBuild.toml",
            r#"
[[target]]
name = "lib"
type = "interface"
includeDirectories = { public = ["inc"] }

[[target]]
name = "app"
link = [{ name = "lib", visibility = "private" }]
"#,
        );
        let (resolver, _, _) = resolve(&project);

        let app = target(&resolver, "app");
        assert!(app.include_directories.public.is_empty());
        assert_eq!(
            app.include_directories.private,
            vec![project.path("inc").to_string_lossy().into_owned()]
        );
        // interface targets have no artifact to link
        assert!(app.resolved_link.is_empty());
    }

    #[test]
    fn test_interface_properties_reach_dependents_only() {
        let project = test_support::cross_manifest();
        let (resolver, _, _) = resolve(&project);

        let core = target(&resolver, "core");
        assert!(!core.definitions.effective().any(|d| d == "USE_CORE"));

        let app = target(&resolver, "app");
        assert_eq!(app.definitions.public, vec!["USE_CORE"]);
        assert_eq!(
            app.include_directories.public,
            vec![project
                .path("libs/core/include")
                .to_string_lossy()
                .into_owned()]
        );
        assert!(app.resolved_link.iter().any(|l| l == "pthread"));
    }

    #[test]
    fn test_public_propagation_is_transitive_in_diamond() {
        let project = test_support::diamond();
        let (resolver, schedule, _) = resolve(&project);

        let d_include = project.path("d/include").to_string_lossy().into_owned();
        for name in ["A", "B", "C"] {
            assert_eq!(
                target(&resolver, name).include_directories.public,
                vec![d_include.clone()],
                "target {}",
                name
            );
        }

        let a = target(&resolver, "A");
        assert_eq!(a.resolved_link.len(), 2);
        assert_eq!(schedule.len(), 3);
    }

    #[test]
    fn test_propagation_reads_final_dependency_bags() {
        // `top` is declared (and registered) before `mid`, so a registration
        // ordered merge would see `mid` before it received `base`'s entries.
        let project = TestProject::new().manifest(
            "CppBuild.toml",
            r#"
[[target]]
name = "top"
link = ["mid"]

[[target]]
name = "mid"
type = "static-library"
link = ["base"]

[[target]]
name = "base"
type = "static-library"
definitions = { public = ["BASE"] }
"#,
        );
        let (resolver, _, _) = resolve(&project);

        assert_eq!(target(&resolver, "top").definitions.public, vec!["BASE"]);
        assert_eq!(target(&resolver, "mid").definitions.public, vec!["BASE"]);
        assert_eq!(target(&resolver, "base").definitions.public, vec!["BASE"]);
    }

    #[test]
    fn test_double_registration_does_not_duplicate() {
        let project = test_support::lib_and_app();
        let generator = RecordingGenerator::new(project.path("out"));
        let mut resolver = DependencyResolver::default();

        let first = resolver
            .register_manifest(&project.path("CppBuild.toml"), None)
            .unwrap();
        let second = resolver
            .register_manifest(&project.path("CppBuild.toml"), None)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(resolver.registry().len(), 2);

        resolver.resolve_links(&generator).unwrap();
        resolver.resolve_links(&generator).unwrap();

        let app = target(&resolver, "App");
        assert_eq!(app.include_directories.public.len(), 1);
        assert_eq!(app.resolved_link.len(), 1);
        assert_eq!(app.depends_on.len(), 1);
    }

    #[test]
    fn test_duplicate_link_entries_merge_once() {
        let project = TestProject::new().manifest(
            "CppBuild.toml",
            r#"
[[target]]
name = "app"
link = ["lib", "lib", { name = "m", system = true }, { name = "m", system = true }]

[[target]]
name = "lib"
type = "static-library"
compilerFlags = { public = ["-pthread"] }
"#,
        );
        let (resolver, _, _) = resolve(&project);

        let app = target(&resolver, "app");
        assert_eq!(app.compiler_flags.public, vec!["-pthread"]);
        assert_eq!(app.resolved_link.len(), 2);
        assert_eq!(app.resolved_link[1], "m");
    }

    #[test]
    fn test_unresolved_link_names_declarer() {
        let project = TestProject::new().manifest(
            "CppBuild.toml",
            "name = \"app\"\nlink = [{ name = \"zlib\", src = \"../nowhere\" }]\n",
        );
        let mut resolver = DependencyResolver::default();
        let err = resolver
            .register_manifest(&project.path("CppBuild.toml"), None)
            .unwrap_err();

        match err {
            EngineError::UnresolvedDependency {
                link,
                target,
                attempts,
                ..
            } => {
                assert_eq!(link, "zlib");
                assert_eq!(target, "app");
                assert_eq!(attempts.len(), 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_name_in_found_manifest() {
        let project = test_support::lib_and_app().manifest(
            "other/CppBuild.toml",
            "name = \"tool\"\nlink = [{ name = \"LibB\", src = \"..\" }]\n",
        );
        let mut resolver = DependencyResolver::default();
        let err = resolver
            .register_manifest(&project.path("other"), None)
            .unwrap_err();

        match err {
            EngineError::UnresolvedDependency { link, attempts, .. } => {
                assert_eq!(link, "LibB");
                assert_eq!(attempts.len(), 1);
                assert!(attempts[0].outcome.contains("no target named `LibB`"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_cycle_fails_before_propagation() {
        let project = test_support::cycle3();
        let generator = RecordingGenerator::new(project.path("out"));
        let mut resolver = DependencyResolver::default();
        resolver
            .register_manifest(&project.path("CppBuild.toml"), None)
            .unwrap();

        let err = resolver.resolve_links(&generator).unwrap_err();
        match err {
            EngineError::CyclicDependency { pending } => {
                assert_eq!(pending, vec!["A", "B", "C"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_propagate_snapshot_is_independent() {
        let generator = RecordingGenerator::new("/out");
        let mut dependency = Target::new("dep", TargetKind::StaticLibrary, "/dep/CppBuild.toml")
            .with_bag(PropertyKind::LinkerDirectories, PropertyBag::interface(["lib"]));
        let mut target = Target::new("app", TargetKind::Application, "/app/CppBuild.toml")
            .with_link(LinkReference::new("dep", "../dep"));

        let snapshot = dependency.clone();
        propagate(&mut target, &snapshot, false, &generator);
        dependency.linker_directories.public.push("late".into());

        assert_eq!(target.linker_directories.public, vec!["/dep/lib"]);
        assert_eq!(target.resolved_link, vec!["/out/dep/dep.lib"]);
    }
}
