//! Small file helpers shared by the JSON repositories.

use std::io;
use std::path::{Path, PathBuf};

/// Write `bytes` to `path` by writing a sibling temp file and renaming it
/// over the target. Parent directories are created as needed.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

/// Read a file, mapping "not found" to `None`.
pub async fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "data".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parents_and_leaves_no_temp() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("nested").join("catalog.json");

        write_atomic(&target, b"{}").await.unwrap();
        write_atomic(&target, b"{\"servers\":[]}").await.unwrap();

        let content = tokio::fs::read_to_string(&target).await.unwrap();
        assert_eq!(content, "{\"servers\":[]}");
        let mut entries = tokio::fs::read_dir(target.parent().unwrap()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["catalog.json"]);
    }

    #[test]
    fn test_temp_names_are_unique_per_write() {
        let target = Path::new("/data/catalog.json");
        let first = temp_path(target);
        let second = temp_path(target);

        assert_ne!(first, second);
        assert_eq!(first.parent(), target.parent());
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".catalog.json.") && name.ends_with(".tmp"));
    }

    #[tokio::test]
    async fn test_read_optional_missing() {
        let tmp = TempDir::new().unwrap();
        let missing = read_optional(&tmp.path().join("nope.json")).await.unwrap();
        assert!(missing.is_none());
    }
}
