//! JSON file implementation of the tool result repository.
//!
//! Each result is its own file, `<dir>/<id>.json`. Records are immutable:
//! saving an id twice is rejected.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use dectool_core::domain::StoredToolResult;
use dectool_core::ports::{ResultStoreError, ToolResultRepository};

use crate::atomic::{read_optional, write_atomic};

/// JSON file implementation of the result repository.
pub struct JsonResultRepository {
    dir: PathBuf,
}

impl JsonResultRepository {
    /// Create a repository storing results under `dir`. The directory is
    /// created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File for `id`, or `None` when the id cannot be a plain file name.
    fn file_for(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.dir.join(format!("{id}.json")))
    }

    async fn read_file(path: &Path) -> Result<Option<StoredToolResult>, ResultStoreError> {
        let Some(bytes) = read_optional(path)
            .await
            .map_err(|e| ResultStoreError::Storage(format!("read {}: {e}", path.display())))?
        else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ResultStoreError::Storage(format!("parse {}: {e}", path.display())))
    }
}

#[async_trait]
impl ToolResultRepository for JsonResultRepository {
    async fn save(&self, result: &StoredToolResult) -> Result<(), ResultStoreError> {
        let path = self
            .file_for(&result.id)
            .ok_or_else(|| ResultStoreError::Storage(format!("invalid result id '{}'", result.id)))?;

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ResultStoreError::AlreadyExists(result.id.clone()));
        }

        let bytes = serde_json::to_vec_pretty(result)
            .map_err(|e| ResultStoreError::Storage(format!("serialize result: {e}")))?;
        write_atomic(&path, &bytes)
            .await
            .map_err(|e| ResultStoreError::Storage(format!("write {}: {e}", path.display())))?;

        tracing::debug!(
            result_id = %result.id,
            server_name = %result.server_name,
            tool_name = %result.tool_name,
            "Stored tool result"
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<StoredToolResult, ResultStoreError> {
        let path = self
            .file_for(id)
            .ok_or_else(|| ResultStoreError::NotFound(id.to_string()))?;
        Self::read_file(&path)
            .await?
            .ok_or_else(|| ResultStoreError::NotFound(id.to_string()))
    }

    async fn list(
        &self,
        owner_id: Option<&str>,
    ) -> Result<Vec<StoredToolResult>, ResultStoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ResultStoreError::Storage(format!(
                    "read {}: {e}",
                    self.dir.display()
                )));
            }
        };

        let mut results = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ResultStoreError::Storage(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::read_file(&path).await {
                Ok(Some(result)) => {
                    if owner_id.is_none_or(|owner| result.owner_id.as_deref() == Some(owner)) {
                        results.push(result);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable result file");
                }
            }
        }

        results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(results)
    }

    async fn delete(&self, id: &str) -> Result<(), ResultStoreError> {
        let path = self
            .file_for(id)
            .ok_or_else(|| ResultStoreError::NotFound(id.to_string()))?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResultStoreError::NotFound(id.to_string()))
            }
            Err(e) => Err(ResultStoreError::Storage(format!(
                "remove {}: {e}",
                path.display()
            ))),
        }
    }

    async fn delete_by_owner(&self, owner_id: &str) -> Result<usize, ResultStoreError> {
        let owned = self.list(Some(owner_id)).await?;
        let mut removed = 0;
        for result in owned {
            match self.delete(&result.id).await {
                Ok(()) => removed += 1,
                Err(ResultStoreError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(owner_id, removed, "Deleted tool results for owner");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dectool_core::domain::{ResultValue, ToolCallResult};
    use serde_json::{Map, Value, json};
    use tempfile::TempDir;

    fn args(query: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("query".to_string(), json!(query));
        map
    }

    fn stored(owner: Option<&str>) -> StoredToolResult {
        let call = ToolCallResult::success(
            "srv-1",
            "Search",
            "search",
            args("rust"),
            ResultValue::TextItems(vec!["hit".to_string()]),
        );
        StoredToolResult::from_call(&call, owner)
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonResultRepository::new(tmp.path().join("results"));

        let failed = ToolCallResult::failure("srv-2", "Files", "read", Map::new(), "boom");
        let records = [stored(Some("decision-1")), StoredToolResult::from_call(&failed, None)];
        for record in &records {
            repo.save(record).await.unwrap();
            assert_eq!(&repo.get(&record.id).await.unwrap(), record);
        }
    }

    #[tokio::test]
    async fn test_results_are_immutable() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonResultRepository::new(tmp.path().join("results"));

        let record = stored(None);
        repo.save(&record).await.unwrap();
        let err = repo.save(&record).await.unwrap_err();
        assert!(matches!(err, ResultStoreError::AlreadyExists(id) if id == record.id));
    }

    #[tokio::test]
    async fn test_list_filters_by_owner_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonResultRepository::new(tmp.path().join("results"));

        assert!(repo.list(None).await.unwrap().is_empty());

        let mut older = stored(Some("d1"));
        older.created_at = Utc::now() - Duration::minutes(5);
        let newer = stored(Some("d1"));
        let other = stored(Some("d2"));
        for r in [&newer, &other, &older] {
            repo.save(r).await.unwrap();
        }

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, older.id);

        let owned: Vec<_> = repo
            .list(Some("d1"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(owned, vec![older.id.clone(), newer.id.clone()]);
    }

    #[tokio::test]
    async fn test_delete_and_delete_by_owner() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonResultRepository::new(tmp.path().join("results"));

        let a = stored(Some("d1"));
        let b = stored(Some("d1"));
        let c = stored(None);
        for r in [&a, &b, &c] {
            repo.save(r).await.unwrap();
        }

        repo.delete(&c.id).await.unwrap();
        assert!(matches!(
            repo.get(&c.id).await,
            Err(ResultStoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete(&c.id).await,
            Err(ResultStoreError::NotFound(_))
        ));

        assert_eq!(repo.delete_by_owner("d1").await.unwrap(), 2);
        assert!(repo.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_like_ids_rejected() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonResultRepository::new(tmp.path().join("results"));

        assert!(matches!(
            repo.get("../catalog").await,
            Err(ResultStoreError::NotFound(_))
        ));

        let mut record = stored(None);
        record.id = "a/b".to_string();
        assert!(matches!(
            repo.save(&record).await,
            Err(ResultStoreError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("results");
        let repo = JsonResultRepository::new(&dir);

        let good = stored(None);
        repo.save(&good).await.unwrap();
        std::fs::write(dir.join("broken.json"), "nope").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let listed = repo.list(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, good.id);
    }
}
