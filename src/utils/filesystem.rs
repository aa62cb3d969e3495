//! File system utility functions

use crate::constants::maven::POM_FILE;
use anyhow::{Context, Result};
use std::path::{Component, Path};

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))?;
    Ok(())
}

/// Whether `path` exists and is a regular file
pub async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

pub async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
}

/// Directory part of a `/`-separated relative POM path (`""` for the root)
pub fn pom_directory(relative_pom: &str) -> &str {
    match relative_pom.rfind('/') {
        Some(idx) => &relative_pom[..idx],
        None => "",
    }
}

/// Relative path of the POM a `<module>` entry points at
///
/// `module` is interpreted relative to `base_dir` the way Maven does: a value
/// ending in `.xml` names the POM file itself, anything else names a
/// directory containing `pom.xml`. The result is lexically normalized so the
/// same file always maps to the same string.
pub fn module_pom_path(base_dir: &str, module: &str) -> String {
    let module = module.trim().replace('\\', "/");
    let joined = if base_dir.is_empty() {
        module.clone()
    } else {
        format!("{base_dir}/{module}")
    };

    let normalized = normalize_relative(&joined);
    if module.ends_with(".xml") {
        normalized
    } else if normalized.is_empty() {
        POM_FILE.to_string()
    } else {
        format!("{normalized}/{POM_FILE}")
    }
}

/// Lexically normalize a relative path into `/`-separated form
///
/// `.` segments are dropped and `..` cancels the previous segment. A `..`
/// that climbs above the start is kept so the path still points at the
/// same place.
pub fn normalize_relative(path: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|last| last != "..") {
                    parts.pop();
                } else {
                    parts.push("..".to_string());
                }
            }
            Component::Normal(segment) => parts.push(segment.to_string_lossy().into_owned()),
        }
    }
    parts.join("/")
}

/// Render a path with `/` separators for stable output across platforms
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directory_exists_new_directory() {
        let temp_dir = TempDir::new().unwrap();
        let new_dir = temp_dir.path().join("new_directory");

        assert!(!new_dir.exists());
        ensure_directory_exists(&new_dir).unwrap();
        assert!(new_dir.is_dir());
    }

    #[test]
    fn test_ensure_directory_exists_existing_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("level1").join("level2");
        fs::create_dir_all(&nested).unwrap();

        ensure_directory_exists(&nested).unwrap();
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn test_is_file_and_is_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("pom.xml");
        fs::write(&file, "<project/>").unwrap();

        assert!(is_file(&file).await);
        assert!(!is_dir(&file).await);
        assert!(is_dir(temp_dir.path()).await);
        assert!(!is_file(temp_dir.path()).await);
        assert!(!is_file(&temp_dir.path().join("missing.xml")).await);
    }

    #[test]
    fn test_pom_directory() {
        assert_eq!(pom_directory("pom.xml"), "");
        assert_eq!(pom_directory("core/pom.xml"), "core");
        assert_eq!(pom_directory("a/b/pom.xml"), "a/b");
    }

    #[test]
    fn test_module_pom_path_variants() {
        assert_eq!(module_pom_path("", "core"), "core/pom.xml");
        assert_eq!(module_pom_path("parent", "child/"), "parent/child/pom.xml");
        assert_eq!(module_pom_path("a", "../b"), "b/pom.xml");
        assert_eq!(module_pom_path("a", ".."), "pom.xml");
        assert_eq!(module_pom_path("", "./x/./y"), "x/y/pom.xml");
        assert_eq!(module_pom_path("", "alt/pom-alt.xml"), "alt/pom-alt.xml");
        assert_eq!(module_pom_path("", "win\\style"), "win/style/pom.xml");
    }

    #[test]
    fn test_normalize_relative_keeps_leading_parent() {
        assert_eq!(normalize_relative("../sibling"), "../sibling");
        assert_eq!(normalize_relative("a/../../b"), "../b");
        assert_eq!(normalize_relative("."), "");
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("owner/repo")), "owner/repo");
        assert_eq!(to_slash(Path::new("./owner/repo")), "owner/repo");
    }
}
