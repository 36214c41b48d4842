//! Wave scheduling over the target dependency graph.
//!
//! Targets are partitioned into waves: every target in a wave depends only on
//! targets from earlier waves (or on targets outside the scheduled set).
//! Targets within one wave are independent of each other.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::errors::{EngineError, EngineResult};
use crate::core::target::{Target, TargetId};

/// A set of targets schedulable together.
pub type Wave = BTreeSet<TargetId>;

/// Ordered waves produced by the [`Scheduler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    waves: Vec<Wave>,
}

impl Schedule {
    /// Get the waves in order.
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Iterate over the waves in order.
    pub fn iter(&self) -> impl Iterator<Item = &Wave> {
        self.waves.iter()
    }

    /// Get the number of waves.
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Index of the wave containing `id`.
    pub fn wave_of(&self, id: TargetId) -> Option<usize> {
        self.waves.iter().position(|w| w.contains(&id))
    }

    /// All scheduled targets, wave by wave.
    pub fn flatten(&self) -> Vec<TargetId> {
        self.waves.iter().flat_map(|w| w.iter().copied()).collect()
    }
}

/// Computes dependency-respecting waves.
pub struct Scheduler;

impl Scheduler {
    /// Partition `targets` into waves.
    ///
    /// Fails with [`EngineError::CyclicDependency`] when an iteration finds no
    /// ready target while some remain; the error lists every pending target.
    pub fn schedule<'a>(
        targets: impl IntoIterator<Item = (TargetId, &'a Target)>,
    ) -> EngineResult<Schedule> {
        let mut graph: DiGraph<TargetId, ()> = DiGraph::new();
        let mut nodes: HashMap<TargetId, NodeIndex> = HashMap::new();
        let mut names: HashMap<TargetId, &str> = HashMap::new();
        let mut edges = Vec::new();

        for (id, target) in targets {
            let node = graph.add_node(id);
            nodes.insert(id, node);
            names.insert(id, target.name.as_str());
            edges.extend(target.depends_on.iter().map(|dep| (id, *dep)));
        }

        // dependent -> dependency; dependencies outside the set count as done
        for (from, to) in edges {
            if let (Some(&a), Some(&b)) = (nodes.get(&from), nodes.get(&to)) {
                if !graph.contains_edge(a, b) {
                    graph.add_edge(a, b, ());
                }
            }
        }

        let mut pending: BTreeSet<NodeIndex> = graph.node_indices().collect();
        let mut waves = Vec::new();

        while !pending.is_empty() {
            let ready: Vec<NodeIndex> = pending
                .iter()
                .copied()
                .filter(|&node| graph.neighbors(node).all(|dep| !pending.contains(&dep)))
                .collect();

            if ready.is_empty() {
                let pending_names = pending
                    .iter()
                    .map(|&node| names[&graph[node]].to_string())
                    .collect();
                return Err(EngineError::CyclicDependency {
                    pending: pending_names,
                });
            }

            for node in &ready {
                pending.remove(node);
            }

            let wave: Wave = ready.into_iter().map(|node| graph[node]).collect();
            tracing::debug!(
                "wave {}: {}",
                waves.len(),
                wave.iter()
                    .map(|id| names[id])
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            waves.push(wave);
        }

        Ok(Schedule { waves })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::TargetKind;
    use crate::resolver::TargetRegistry;

    fn registry(edges: &[(&str, Vec<&str>)]) -> (TargetRegistry, HashMap<String, TargetId>) {
        let mut registry = TargetRegistry::new();
        let mut ids = HashMap::new();
        for (name, _) in edges {
            let target = Target::new(*name, TargetKind::StaticLibrary, "/p/CppBuild.toml");
            let (id, _) = registry.insert(target);
            ids.insert(name.to_string(), id);
        }
        for (name, deps) in edges {
            let id = ids[*name];
            registry[id].depends_on = deps.iter().map(|d| ids[*d]).collect();
        }
        (registry, ids)
    }

    #[test]
    fn test_diamond_waves() {
        let (registry, ids) = registry(&[
            ("A", vec!["B", "C"]),
            ("B", vec!["D"]),
            ("C", vec!["D"]),
            ("D", vec![]),
        ]);

        let schedule = Scheduler::schedule(registry.iter()).unwrap();
        let wave = |n: &str| schedule.wave_of(ids[n]).unwrap();

        assert_eq!(schedule.len(), 3);
        assert!(wave("D") < wave("B"));
        assert!(wave("D") < wave("C"));
        assert!(wave("A") > wave("B"));
        assert!(wave("A") > wave("C"));
        assert_eq!(wave("B"), wave("C"));
        assert_eq!(schedule.flatten().len(), 4);
    }

    #[test]
    fn test_cycle_reports_all_pending() {
        let (registry, _) = registry(&[
            ("leaf", vec![]),
            ("A", vec!["B"]),
            ("B", vec!["C"]),
            ("C", vec!["A"]),
            ("top", vec!["A"]),
        ]);

        let err = Scheduler::schedule(registry.iter()).unwrap_err();
        match err {
            EngineError::CyclicDependency { pending } => {
                assert_eq!(pending, vec!["A", "B", "C", "top"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_external_dependency_counts_as_scheduled() {
        let (registry, ids) = registry(&[("lib", vec![]), ("app", vec!["lib"])]);

        // Schedule only `app`; `lib` is outside the set.
        let subset = registry.iter().filter(|(id, _)| *id == ids["app"]);
        let schedule = Scheduler::schedule(subset).unwrap();

        assert_eq!(schedule.len(), 1);
        assert!(schedule.waves()[0].contains(&ids["app"]));
    }

    #[test]
    fn test_empty() {
        let registry = TargetRegistry::new();
        assert!(Scheduler::schedule(registry.iter()).unwrap().is_empty());
    }
}
