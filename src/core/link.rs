//! Link references between targets.

use std::fmt;

use serde::Deserialize;

use crate::core::property::Visibility;
use crate::core::target::TargetId;

/// A `link` entry as written in a manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLink {
    /// `"LibA"` - a target declared in the same manifest
    Name(String),
    /// `{ name = "LibA", src = "../liba" }`
    Detailed(DetailedLink),
}

/// Detailed link entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedLink {
    /// Name of the target to link
    pub name: String,

    /// Manifest path or package name the target is declared in
    #[serde(default)]
    pub src: Option<String>,

    /// Whether the dependency's exported properties become public here
    #[serde(default)]
    pub visibility: Option<Visibility>,

    /// A system library passed through to the linker by name
    #[serde(default)]
    pub system: bool,
}

/// A normalized link from one target to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    /// Name of the linked target (or system library)
    pub name: String,

    /// Where the linked target is declared, as written (relative to the
    /// declaring manifest's directory, or a package name)
    pub source_script_path: String,

    /// Use-site visibility of the edge
    pub visibility: Visibility,

    /// System libraries are never looked up
    pub system: bool,

    /// Set once the resolver matched this reference to a registered target
    pub resolved: Option<TargetId>,
}

impl LinkReference {
    /// Create a reference to a target declared in `source_script_path`.
    pub fn new(name: impl Into<String>, source_script_path: impl Into<String>) -> Self {
        LinkReference {
            name: name.into(),
            source_script_path: source_script_path.into(),
            visibility: Visibility::Public,
            system: false,
            resolved: None,
        }
    }

    /// Create a system library reference.
    pub fn system(name: impl Into<String>) -> Self {
        LinkReference {
            name: name.into(),
            source_script_path: String::new(),
            visibility: Visibility::Private,
            system: true,
            resolved: None,
        }
    }

    /// Check if the link is private at its use site.
    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// Check if this reference still needs a manifest lookup.
    pub fn needs_lookup(&self) -> bool {
        !self.system && self.resolved.is_none()
    }

    /// Normalize a raw manifest entry.
    ///
    /// Bare names and entries without `src` point at the declaring manifest.
    pub fn from_raw(raw: RawLink, origin_script_path: &str) -> Self {
        match raw {
            RawLink::Name(name) => LinkReference::new(name, origin_script_path),
            RawLink::Detailed(d) if d.system => LinkReference::system(d.name),
            RawLink::Detailed(d) => LinkReference {
                name: d.name,
                source_script_path: d.src.unwrap_or_else(|| origin_script_path.to_string()),
                visibility: d.visibility.unwrap_or_default(),
                system: false,
                resolved: None,
            },
        }
    }
}

impl fmt::Display for LinkReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.system {
            write!(f, "{} (system)", self.name)
        } else {
            write!(f, "{} (from `{}`)", self.name, self.source_script_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        link: Vec<RawLink>,
    }

    #[test]
    fn test_bare_name_points_at_origin() {
        let holder: Holder = toml::from_str(r#"link = ["LibA"]"#).unwrap();
        let link = LinkReference::from_raw(holder.link[0].clone(), "/proj/CppBuild.toml");

        assert_eq!(link.name, "LibA");
        assert_eq!(link.source_script_path, "/proj/CppBuild.toml");
        assert_eq!(link.visibility, Visibility::Public);
        assert!(link.needs_lookup());
    }

    #[test]
    fn test_detailed_entries() {
        let holder: Holder = toml::from_str(
            r#"link = [
                { name = "zlib", src = "../zlib", visibility = "private" },
                { name = "m", system = true },
            ]"#,
        )
        .unwrap();

        let zlib = LinkReference::from_raw(holder.link[0].clone(), "/proj/CppBuild.toml");
        assert_eq!(zlib.source_script_path, "../zlib");
        assert!(zlib.is_private());

        let m = LinkReference::from_raw(holder.link[1].clone(), "/proj/CppBuild.toml");
        assert!(m.system);
        assert!(!m.needs_lookup());
    }
}
