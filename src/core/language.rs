//! Source languages and extension lookup.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source language of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C language
    C,
    /// C++ language
    #[serde(alias = "cpp", alias = "cxx", alias = "c++")]
    Cxx,
}

impl Language {
    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
        }
    }

    /// Select the compiler language for a source file from its extension.
    ///
    /// Returns `None` for files no compiler handles (headers, docs, ...).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Language> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext {
            "c" => Some(Language::C),
            "cpp" | "cxx" | "cc" | "c++" | "C" => Some(Language::Cxx),
            _ => None,
        }
    }
}
