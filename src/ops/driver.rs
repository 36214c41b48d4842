//! Writes generated build files to disk.
//!
//! The driver walks a tree of [`PlanNode`]s. Each group gets a fan-out build
//! file in its directory and one subdirectory per member; each leaf target
//! gets its own build file in its subdirectory. The output directory is
//! always an explicit argument, never the process working directory.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::core::errors::{EngineError, EngineResult};
use crate::core::target::TargetId;
use crate::generator::{BuildNode, Generator, Group, GroupMember, WorkingDirGuard};
use crate::resolver::{Schedule, TargetRegistry};
use crate::util::fs::{ensure_dir, write_atomic};

/// One node of the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanNode {
    /// A registered target
    Leaf(TargetId),
    /// A named directory of members, in build order
    Group { name: String, members: Vec<PlanNode> },
}

impl PlanNode {
    /// The root group: every scheduled target, wave by wave.
    pub fn root(name: impl Into<String>, schedule: &Schedule) -> Self {
        PlanNode::Group {
            name: name.into(),
            members: schedule.flatten().into_iter().map(PlanNode::Leaf).collect(),
        }
    }

    fn name<'a>(&'a self, registry: &'a TargetRegistry) -> &'a str {
        match self {
            PlanNode::Leaf(id) => &registry[*id].name,
            PlanNode::Group { name, .. } => name,
        }
    }

    fn leaves(&self, out: &mut Vec<TargetId>) {
        match self {
            PlanNode::Leaf(id) => out.push(*id),
            PlanNode::Group { members, .. } => {
                for member in members {
                    member.leaves(out);
                }
            }
        }
    }
}

/// Files written by a generation run, in write order.
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    pub files: Vec<PathBuf>,
}

/// Drives a [`Generator`] over the output tree.
pub struct BuildDriver<'a> {
    registry: &'a TargetRegistry,
    generator: &'a mut dyn Generator,
    report: GenerateReport,
}

impl<'a> BuildDriver<'a> {
    pub fn new(registry: &'a TargetRegistry, generator: &'a mut dyn Generator) -> Self {
        BuildDriver {
            registry,
            generator,
            report: GenerateReport::default(),
        }
    }

    /// Generate the whole schedule as one root group in `out_dir`.
    pub fn generate_all(
        self,
        schedule: &Schedule,
        out_dir: &Path,
        name: &str,
    ) -> EngineResult<GenerateReport> {
        self.generate_tree(&PlanNode::root(name, schedule), out_dir)
    }

    /// Generate an arbitrary tree rooted in `out_dir`.
    ///
    /// Output directory collisions are detected before anything is written.
    /// A write failure aborts the run; files written before it stay on disk.
    pub fn generate_tree(
        mut self,
        root: &PlanNode,
        out_dir: &Path,
    ) -> EngineResult<GenerateReport> {
        self.check_collisions(root, out_dir)?;
        match root {
            PlanNode::Leaf(id) => self.generate_leaf(*id, out_dir)?,
            PlanNode::Group { name, members } => self.generate_group(name, members, out_dir)?,
        }
        Ok(self.report)
    }

    fn check_collisions(&self, node: &PlanNode, dir: &Path) -> EngineResult<()> {
        let PlanNode::Group { members, .. } = node else {
            return Ok(());
        };

        let mut seen: HashMap<&str, String> = HashMap::new();
        for member in members {
            let name = member.name(self.registry);
            let label = match member {
                PlanNode::Leaf(id) => self.registry[*id].key().to_string(),
                PlanNode::Group { name, .. } => name.clone(),
            };
            if let Some(first) = seen.insert(name, label.clone()) {
                return Err(EngineError::OutputCollision {
                    first,
                    second: label,
                    dir: dir.join(name),
                });
            }
            self.check_collisions(member, &dir.join(name))?;
        }
        Ok(())
    }

    fn generate_group(
        &mut self,
        name: &str,
        members: &[PlanNode],
        dir: &Path,
    ) -> EngineResult<()> {
        ensure_dir(dir).map_err(|e| EngineError::write(dir, e))?;

        let group = self.group(name, members);
        let file = self.generator.generate(&BuildNode::Group(group))?;
        self.write(dir, &file.content)?;

        for member in members {
            let member_dir = dir.join(member.name(self.registry));
            match member {
                PlanNode::Leaf(id) => self.generate_leaf(*id, &member_dir)?,
                PlanNode::Group { name, members } => {
                    self.generate_group(name, members, &member_dir)?
                }
            }
        }
        Ok(())
    }

    fn generate_leaf(&mut self, id: TargetId, dir: &Path) -> EngineResult<()> {
        let registry = self.registry;
        let target = &registry[id];
        ensure_dir(dir).map_err(|e| EngineError::write(dir, e))?;
        tracing::debug!("generating `{}` with {}", target.name, self.generator.name());

        let file = {
            let generator =
                WorkingDirGuard::new(&mut *self.generator, target.origin_dir().to_path_buf());
            generator.generate(&BuildNode::Leaf(target))?
        };
        self.write(dir, &file.content)
    }

    /// Group view handed to the generator: member names plus, for each
    /// member, the sibling members it depends on.
    fn group<'n>(&self, name: &str, members: &'n [PlanNode]) -> Group<'n>
    where
        'a: 'n,
    {
        let registry: &'n TargetRegistry = self.registry;
        let owner: HashMap<TargetId, &'n str> = members
            .iter()
            .flat_map(|member| {
                let mut leaves = Vec::new();
                member.leaves(&mut leaves);
                let member_name = member.name(registry);
                leaves.into_iter().map(move |id| (id, member_name))
            })
            .collect();

        let members = members
            .iter()
            .map(|member| {
                let member_name = member.name(registry);
                let mut leaves = Vec::new();
                member.leaves(&mut leaves);

                let mut seen = HashSet::new();
                let depends_on = leaves
                    .iter()
                    .flat_map(|id| registry[*id].depends_on.iter())
                    .filter_map(|dep| owner.get(dep).copied())
                    .filter(|dep| *dep != member_name && seen.insert(*dep))
                    .collect();

                GroupMember {
                    name: member_name,
                    depends_on,
                }
            })
            .collect();

        Group {
            name: name.to_string(),
            members,
        }
    }

    fn write(&mut self, dir: &Path, content: &str) -> EngineResult<()> {
        let path = dir.join(self.generator.build_file_name());
        write_atomic(&path, content).map_err(|e| EngineError::write(&path, e))?;
        tracing::info!("wrote {}", path.display());
        self.report.files.push(path);
        Ok(())
    }
}
