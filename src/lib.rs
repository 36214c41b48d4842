//! CppBuild - build file generation for native C and C++ targets
//!
//! This crate loads declarative target manifests, resolves links between
//! targets, propagates scoped build properties along those links, and writes
//! backend build files (GNU Make, Premake5) in dependency order.

pub mod core;
pub mod generator;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for CppBuild unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides on-disk project fixtures and a recording generator.
#[cfg(test)]
pub mod test_support;

pub use core::{EngineError, EngineResult, Target, TargetKind};
pub use generator::{Generator, GeneratorKind};
pub use resolver::{DependencyResolver, Schedule};
pub use util::context::GlobalContext;
