//! Core data structures for CppBuild.
//!
//! This module contains the foundational types used throughout CppBuild:
//! - Targets and their scoped property bags
//! - Link references between targets
//! - Manifests and the loader that normalizes them
//! - The engine error taxonomy

pub mod errors;
pub mod language;
pub mod link;
pub mod manifest;
pub mod property;
pub mod target;

pub use errors::{EngineError, EngineResult};
pub use language::Language;
pub use link::LinkReference;
pub use manifest::{LoadedManifest, ManifestLoader, MANIFEST_NAME};
pub use property::{PropertyBag, PropertyKind, Visibility};
pub use target::{Target, TargetId, TargetKind};
