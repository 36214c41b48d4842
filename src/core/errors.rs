//! Engine error types and diagnostics.
//!
//! Every error is fatal for the current run: nothing retries, skips, or
//! continues past the failing step.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::resolver::strategy::ResolutionAttempt;
use crate::util::diagnostic::Diagnostic;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error raised while loading, resolving, scheduling, or generating targets.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load manifest `{}`: {reason}", path.display())]
    ManifestLoad { path: PathBuf, reason: String },

    #[error("invalid target type `{value}` for target `{target}`")]
    InvalidTargetType {
        value: String,
        target: String,
        manifest: PathBuf,
    },

    #[error("could not resolve link `{link}` declared by target `{target}`")]
    UnresolvedDependency {
        link: String,
        source_script_path: String,
        target: String,
        manifest: PathBuf,
        attempts: Vec<ResolutionAttempt>,
    },

    #[error("cyclic dependency found between targets: {}", pending.join(", "))]
    CyclicDependency { pending: Vec<String> },

    #[error("targets `{first}` and `{second}` would both be generated into `{}`", dir.display())]
    OutputCollision {
        first: String,
        second: String,
        dir: PathBuf,
    },

    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    /// Create a manifest load error.
    pub fn manifest_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        EngineError::ManifestLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a write error.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EngineError::Write {
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EngineError::ManifestLoad { path, reason } => {
                Diagnostic::error(format!("failed to load manifest: {}", reason))
                    .with_location(path)
                    .with_suggestion("Check that the manifest exists and is valid TOML")
            }

            EngineError::InvalidTargetType {
                value,
                target,
                manifest,
            } => Diagnostic::error(format!(
                "invalid target type `{}` for target `{}`",
                value, target
            ))
            .with_location(manifest)
            .with_context(
                "valid types: application, interface, static-library, dynamic-library",
            ),

            EngineError::UnresolvedDependency {
                link,
                source_script_path,
                target,
                manifest,
                attempts,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "could not resolve link `{}` (from `{}`) declared by target `{}`",
                    link, source_script_path, target
                ))
                .with_location(manifest);

                for attempt in attempts {
                    diag = diag.with_context(attempt.to_string());
                }

                diag.with_suggestion(format!(
                    "Declare a target named `{}` in the referenced manifest",
                    link
                ))
                .with_suggestion("Mark the entry `system = true` if it is a system library")
            }

            EngineError::CyclicDependency { pending } => {
                Diagnostic::error("cyclic dependency found when scheduling targets")
                    .with_context(format!("unschedulable targets: {}", pending.join(", ")))
                    .with_suggestion(
                        "Break the cycle by removing or restructuring links".to_string(),
                    )
            }

            EngineError::OutputCollision { first, second, dir } => Diagnostic::error(format!(
                "targets `{}` and `{}` share an output directory",
                first, second
            ))
            .with_location(dir)
            .with_suggestion("Rename one of the targets"),

            EngineError::Write { path, source } => {
                Diagnostic::error(format!("failed to write build file: {}", source))
                    .with_location(path)
            }
        }
    }
}
