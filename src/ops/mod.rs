//! High-level operations.
//!
//! This module contains the implementation of CppBuild commands.

pub mod discover;
pub mod driver;
pub mod generate;

pub use discover::{discover, DiscoverOptions, DiscoverReport, TargetMetadata};
pub use driver::{BuildDriver, GenerateReport, PlanNode};
pub use generate::{generate, resolve, GenerateOptions, Resolved};
