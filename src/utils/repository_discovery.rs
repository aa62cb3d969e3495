//! Repository discovery: directory scans and piped repository lists

use crate::config::{RepositoryBuilder, RepositoryDescriptor};
use crate::github::RepositoryEntry;
use crate::pom::parser::check_well_formed;
use crate::utils::filesystem::{is_dir, is_file};
use anyhow::{Context, Result, ensure};
use std::path::Path;
use walkdir::WalkDir;

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Find every `<root>/<owner>/<name>` directory
///
/// Hidden directories are skipped at both levels. Results are sorted by
/// relative path so repeated scans list repositories in the same order.
pub fn scan_repositories(root: &Path) -> Result<Vec<RepositoryDescriptor>> {
    ensure!(root.is_dir(), "Scan root {} is not a directory", root.display());

    let mut repositories = Vec::new();
    for entry in WalkDir::new(root)
        .max_depth(2)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|e| e.ok())
    {
        if entry.depth() != 2 || !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let owner = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = entry.file_name().to_string_lossy().into_owned();

        repositories.push(
            RepositoryBuilder::new(owner, name)
                .with_root(root)
                .with_path(path)
                .build(),
        );
    }

    repositories.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(repositories)
}

/// Parse a structured repository list as produced by `list`, `clone` or `validate`
pub fn parse_repository_list(json: &str) -> Result<Vec<RepositoryEntry>> {
    serde_json::from_str(json).context("Failed to parse repository list")
}

/// Descriptors for every entry not already marked invalid
///
/// An entry without a path is expected at `<root>/<owner>/<name>`; a
/// relative path is taken relative to `root`.
pub fn descriptors_from_entries(
    entries: &[RepositoryEntry],
    root: &Path,
) -> Vec<RepositoryDescriptor> {
    entries
        .iter()
        .filter(|entry| entry.valid != Some(false))
        .map(|entry| {
            let builder = RepositoryBuilder::new(entry.owner.login.clone(), entry.name.clone())
                .with_root(root);
            match &entry.path {
                Some(path) => builder.with_path(root.join(path)),
                None => builder,
            }
            .build()
        })
        .collect()
}

/// Check that a repository holds a well-formed root POM
///
/// Returns the reason the repository cannot take part in aggregation.
pub async fn validate_repository(repository: &RepositoryDescriptor) -> Result<(), String> {
    if !is_dir(&repository.path).await {
        return Err(format!("{} is not a directory", repository.path.display()));
    }
    let pom = repository.pom_path();
    if !is_file(&pom).await {
        return Err("no pom.xml at repository root".to_string());
    }
    let content = tokio::fs::read_to_string(&pom)
        .await
        .map_err(|e| format!("cannot read pom.xml: {}", e))?;
    check_well_formed(&content).map_err(|e| format!("malformed pom.xml: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_repo(root: &Path, relative: &str, pom: Option<&str>) {
        let dir = root.join(relative);
        fs::create_dir_all(&dir).unwrap();
        if let Some(pom) = pom {
            fs::write(dir.join("pom.xml"), pom).unwrap();
        }
    }

    #[test]
    fn test_scan_repositories_owner_name_layout() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_repo(root, "zeta/lib", None);
        make_repo(root, "acme/widgets", None);
        make_repo(root, "acme/.cache", None);
        make_repo(root, ".hidden/repo", None);
        fs::write(root.join("acme/notes.txt"), "not a repo").unwrap();
        fs::write(root.join("pom.xml"), "<project/>").unwrap();
        make_repo(root, ".git/objects", None);
        make_repo(root, ".git/refs", None);

        let repos = scan_repositories(root).unwrap();
        let names: Vec<&str> = repos.iter().map(|r| r.relative_path.as_str()).collect();
        assert_eq!(names, vec!["acme/widgets", "zeta/lib"]);
        assert_eq!(repos[0].owner, "acme");
        assert_eq!(repos[0].name, "widgets");
        assert_eq!(repos[0].path, root.join("acme/widgets"));
    }

    #[test]
    fn test_scan_repositories_missing_root() {
        let result = scan_repositories(Path::new("/this/path/does/not/exist"));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_repository_list_and_select_valid() {
        let json = r#"[
            {"name": "a", "owner": {"login": "acme"}, "path": "acme/a", "valid": true},
            {"name": "b", "owner": {"login": "acme"}, "valid": false, "reason": "no pom.xml"},
            {"name": "c", "owner": {"login": "acme"}, "valid": true, "extra": 1},
            {"name": "d", "owner": {"login": "acme"}, "path": "/abs/d", "valid": true}
        ]"#;
        let entries = parse_repository_list(json).unwrap();
        assert_eq!(entries.len(), 4);

        let root = Path::new("/work");
        let repos = descriptors_from_entries(&entries, root);
        let paths: Vec<_> = repos.iter().map(|r| r.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                root.join("acme/a"),
                root.join("acme/c"),
                Path::new("/abs/d").to_path_buf()
            ]
        );
        assert_eq!(repos[1].relative_path, "acme/c");
        assert_eq!(repos[2].relative_path, "acme/d");
    }

    #[test]
    fn test_parse_repository_list_rejects_garbage() {
        assert!(parse_repository_list("{not json").is_err());
    }

    #[test]
    fn test_scan_repositories_skips_git_checkout_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_repo(root, ".git/objects", None);
        make_repo(root, ".git/refs/heads", None);

        let repos = scan_repositories(root).unwrap();
        assert!(repos.is_empty(), "unexpected: {:?}", repos);
    }

    #[tokio::test]
    async fn test_validate_repository_reasons() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_repo(root, "acme/good", Some("<project><artifactId>g</artifactId></project>"));
        make_repo(root, "acme/empty", None);
        make_repo(root, "acme/broken", Some("<project>"));

        let descriptor = |name: &str| {
            RepositoryBuilder::new("acme", name).with_root(root).build()
        };

        assert!(validate_repository(&descriptor("good")).await.is_ok());
        assert_eq!(
            validate_repository(&descriptor("empty")).await.unwrap_err(),
            "no pom.xml at repository root"
        );
        assert!(validate_repository(&descriptor("broken"))
            .await
            .unwrap_err()
            .starts_with("malformed pom.xml"));
        assert!(validate_repository(&descriptor("missing"))
            .await
            .unwrap_err()
            .contains("is not a directory"));

        // A directory named pom.xml is not a POM
        make_repo(root, "acme/odd/pom.xml", None);
        assert_eq!(
            validate_repository(&descriptor("odd")).await.unwrap_err(),
            "no pom.xml at repository root"
        );
    }
}
