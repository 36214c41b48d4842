//! Global target registry keyed by identity.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use crate::core::target::{Target, TargetId, TargetKey};

/// Every target known to a run, in registration order.
///
/// Targets are keyed by `(name, origin manifest)`; inserting an identity that
/// is already present is a no-op returning the existing id.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    index: HashMap<TargetKey, TargetId>,
}

impl TargetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a target. Returns its id and whether it was newly added.
    pub fn insert(&mut self, target: Target) -> (TargetId, bool) {
        let key = target.key();
        if let Some(&id) = self.index.get(&key) {
            return (id, false);
        }

        let id = TargetId(self.targets.len());
        self.targets.push(target);
        self.index.insert(key, id);
        (id, true)
    }

    /// Find the first registered target with `name`.
    pub fn find_by_name(&self, name: &str) -> Option<TargetId> {
        self.iter().find(|(_, t)| t.name == name).map(|(id, _)| id)
    }

    /// Iterate over all targets in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &Target)> {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, t)| (TargetId(i), t))
    }

    /// All ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = TargetId> {
        (0..self.targets.len()).map(TargetId)
    }

    /// Get the number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Index<TargetId> for TargetRegistry {
    type Output = Target;

    fn index(&self, id: TargetId) -> &Target {
        &self.targets[id.0]
    }
}

impl IndexMut<TargetId> for TargetRegistry {
    fn index_mut(&mut self, id: TargetId) -> &mut Target {
        &mut self.targets[id.0]
    }
}
