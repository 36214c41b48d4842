//! Filesystem utilities.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write a file by way of a sibling temp file.
///
/// The destination either keeps its previous contents or receives the
/// complete new contents, never a truncated mix.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Resolve `path` against `base` and normalize `.`/`..` lexically.
///
/// Absolute inputs are only normalized. The result does not touch the
/// filesystem, so it works for directories that do not exist yet.
pub fn absolutize(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    normalize_lexically(&joined)
}

/// Normalize `.` and `..` components without consulting the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absolutize() {
        let base = Path::new("/proj/libs/core");
        assert_eq!(absolutize(base, "include"), PathBuf::from("/proj/libs/core/include"));
        assert_eq!(absolutize(base, "../shared/./inc"), PathBuf::from("/proj/libs/shared/inc"));
        assert_eq!(absolutize(base, "/usr/include"), PathBuf::from("/usr/include"));
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Makefile");

        write_atomic(&file, "first").unwrap();
        write_atomic(&file, "second").unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "second");
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("missing").join("Makefile");
        assert!(write_atomic(&file, "x").is_err());
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/proj"), Path::new("/proj/libs/CppBuild.toml")),
            PathBuf::from("libs/CppBuild.toml")
        );
    }
}
