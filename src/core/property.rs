//! Visibility-scoped property bags.
//!
//! Every build property of a target (include directories, flags, ...) is kept
//! as three ordered lists:
//! - `public`: used by the target and propagated to its dependents
//! - `private`: used by the target only
//! - `interface`: not used by the target, only propagated to dependents
//!
//! Manifests may spell a bag either as a bare list (private only) or as an
//! explicit `{ public, private, interface }` table. Both shapes are folded into
//! the canonical [`PropertyBag`] when the manifest is parsed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visibility scope of a property entry or of a link edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Used here and propagated to dependents
    Public,
    /// Used here only
    Private,
    /// Propagated to dependents only
    Interface,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Public
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Interface => write!(f, "interface"),
        }
    }
}

/// The five propagated property fields of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    IncludeDirectories,
    LinkerDirectories,
    CompilerFlags,
    Definitions,
    LinkerFlags,
}

impl PropertyKind {
    /// All property kinds, in manifest order.
    pub const ALL: [PropertyKind; 5] = [
        PropertyKind::IncludeDirectories,
        PropertyKind::LinkerDirectories,
        PropertyKind::CompilerFlags,
        PropertyKind::Definitions,
        PropertyKind::LinkerFlags,
    ];

    /// Whether entries of this kind are filesystem paths.
    ///
    /// Path entries are rewritten to absolute form before they cross a
    /// dependency edge.
    pub fn is_path(&self) -> bool {
        matches!(
            self,
            PropertyKind::IncludeDirectories | PropertyKind::LinkerDirectories
        )
    }

    /// Field name as written in manifests.
    pub fn manifest_key(&self) -> &'static str {
        match self {
            PropertyKind::IncludeDirectories => "includeDirectories",
            PropertyKind::LinkerDirectories => "linkerDirectories",
            PropertyKind::CompilerFlags => "compilerFlags",
            PropertyKind::Definitions => "definitions",
            PropertyKind::LinkerFlags => "linkerFlags",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

/// Canonical scoped property collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertyBag {
    pub public: Vec<String>,
    pub private: Vec<String>,
    pub interface: Vec<String>,
}

impl PropertyBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bag holding only private entries.
    pub fn private(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        PropertyBag {
            private: items.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Create a bag holding only public entries.
    pub fn public(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        PropertyBag {
            public: items.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Create a bag holding only interface entries.
    pub fn interface(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        PropertyBag {
            interface: items.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Get the mutable list for a scope.
    pub fn scope_mut(&mut self, visibility: Visibility) -> &mut Vec<String> {
        match visibility {
            Visibility::Public => &mut self.public,
            Visibility::Private => &mut self.private,
            Visibility::Interface => &mut self.interface,
        }
    }

    /// Entries the owning target itself uses: `public ++ private`.
    pub fn effective(&self) -> impl Iterator<Item = &String> {
        self.public.iter().chain(self.private.iter())
    }

    /// Entries the owning target hands to its dependents: `interface ++ public`.
    pub fn exported(&self) -> Vec<String> {
        self.interface
            .iter()
            .chain(self.public.iter())
            .cloned()
            .collect()
    }

    /// Check if all three scopes are empty.
    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.private.is_empty() && self.interface.is_empty()
    }
}

/// A property bag as written in a manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPropertyBag {
    /// `includeDirectories = ["a", "b"]` (private only)
    List(Vec<String>),
    /// `[includeDirectories]` table with any of the three scopes
    Scoped(ScopedProperties),
}

/// Explicit scoped form of a property bag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopedProperties {
    #[serde(default)]
    pub public: Vec<String>,
    #[serde(default)]
    pub private: Vec<String>,
    #[serde(default)]
    pub interface: Vec<String>,
}

impl From<RawPropertyBag> for PropertyBag {
    fn from(raw: RawPropertyBag) -> Self {
        match raw {
            RawPropertyBag::List(items) => PropertyBag::private(items),
            RawPropertyBag::Scoped(scoped) => PropertyBag {
                public: scoped.public,
                private: scoped.private,
                interface: scoped.interface,
            },
        }
    }
}

/// Normalize an optional raw bag; absence becomes the all-empty triple.
pub fn normalize_bag(raw: Option<RawPropertyBag>) -> PropertyBag {
    raw.map(PropertyBag::from).unwrap_or_default()
}
