//! JSON file implementation of the tool catalog repository.
//!
//! The whole catalog is one document at `<root>/catalog.json`. It is loaded
//! lazily on first access and cached behind an async `RwLock`; every mutation
//! writes the full document atomically before the cache is replaced, so a
//! failed write leaves both disk and memory unchanged.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use dectool_core::domain::{
    NewServerConfig, ServerConfig, ToolConfig, ToolDescriptor, UpdateToolConfig, new_id,
};
use dectool_core::ports::{CatalogError, ToolCatalogRepository};

use crate::atomic::{read_optional, write_atomic};

const CATALOG_VERSION: u32 = 1;

/// On-disk catalog document.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    servers: Vec<ServerConfig>,
}

const fn default_version() -> u32 {
    CATALOG_VERSION
}

/// JSON file implementation of the catalog repository.
pub struct JsonCatalogRepository {
    path: PathBuf,
    servers: RwLock<Option<Vec<ServerConfig>>>,
}

impl JsonCatalogRepository {
    /// Create a repository for the catalog file at `path`. No I/O happens
    /// until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            servers: RwLock::new(None),
        }
    }

    async fn load_from_disk(&self) -> Result<Vec<ServerConfig>, CatalogError> {
        let Some(bytes) = read_optional(&self.path).await.map_err(|e| {
            CatalogError::Internal(format!("read {}: {e}", self.path.display()))
        })?
        else {
            tracing::debug!(path = %self.path.display(), "Catalog file absent, starting empty");
            return Ok(Vec::new());
        };

        let file: CatalogFile = serde_json::from_slice(&bytes).map_err(|e| {
            CatalogError::Internal(format!("parse {}: {e}", self.path.display()))
        })?;
        tracing::debug!(
            path = %self.path.display(),
            version = file.version,
            servers = file.servers.len(),
            "Loaded tool catalog"
        );
        Ok(file.servers)
    }

    async fn persist(&self, servers: &[ServerConfig]) -> Result<(), CatalogError> {
        let file = CatalogFile {
            version: CATALOG_VERSION,
            servers: servers.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&file)
            .map_err(|e| CatalogError::Internal(format!("serialize catalog: {e}")))?;
        write_atomic(&self.path, &bytes).await.map_err(|e| {
            CatalogError::Internal(format!("write {}: {e}", self.path.display()))
        })
    }

    /// Run `f` against the cached catalog, loading it first if needed.
    async fn read<T>(&self, f: impl FnOnce(&[ServerConfig]) -> T) -> Result<T, CatalogError> {
        {
            let guard = self.servers.read().await;
            if let Some(servers) = guard.as_deref() {
                return Ok(f(servers));
            }
        }

        let mut guard = self.servers.write().await;
        if guard.is_none() {
            *guard = Some(self.load_from_disk().await?);
        }
        Ok(f(guard.as_deref().unwrap_or_default()))
    }

    /// Apply `f` to a copy of the catalog, persist it, then swap it in.
    async fn write<T>(
        &self,
        f: impl FnOnce(&mut Vec<ServerConfig>) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut guard = self.servers.write().await;
        let mut next = match guard.as_ref() {
            Some(servers) => servers.clone(),
            None => self.load_from_disk().await?,
        };

        let out = f(&mut next)?;
        self.persist(&next).await?;
        *guard = Some(next);
        Ok(out)
    }
}

fn find_mut<'a>(
    servers: &'a mut [ServerConfig],
    id: &str,
) -> Result<&'a mut ServerConfig, CatalogError> {
    servers
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))
}

#[async_trait]
impl ToolCatalogRepository for JsonCatalogRepository {
    async fn insert(&self, server: NewServerConfig) -> Result<ServerConfig, CatalogError> {
        let created = self
            .write(|servers| {
                if servers.iter().any(|s| s.name == server.name) {
                    return Err(CatalogError::Conflict(server.name.clone()));
                }
                let created = ServerConfig::from_new(new_id(), server);
                servers.push(created.clone());
                Ok(created)
            })
            .await?;

        tracing::debug!(server_id = %created.id, server_name = %created.name, "Inserted tool server");
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> Result<ServerConfig, CatalogError> {
        self.read(|servers| servers.iter().find(|s| s.id == id).cloned())
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn get_by_name(&self, name: &str) -> Result<ServerConfig, CatalogError> {
        self.read(|servers| servers.iter().find(|s| s.name == name).cloned())
            .await?
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    async fn list(&self) -> Result<Vec<ServerConfig>, CatalogError> {
        self.read(|servers| servers.to_vec()).await
    }

    async fn update(&self, server: &ServerConfig) -> Result<(), CatalogError> {
        self.write(|servers| {
            if servers
                .iter()
                .any(|s| s.id != server.id && s.name == server.name)
            {
                return Err(CatalogError::Conflict(server.name.clone()));
            }
            let slot = find_mut(servers, &server.id)?;
            *slot = server.clone();
            slot.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        self.write(|servers| {
            let before = servers.len();
            servers.retain(|s| s.id != id);
            if servers.len() == before {
                return Err(CatalogError::NotFound(id.to_string()));
            }
            Ok(())
        })
        .await?;

        tracing::debug!(server_id = %id, "Deleted tool server");
        Ok(())
    }

    async fn update_tool(
        &self,
        server_id: &str,
        tool_name: &str,
        update: UpdateToolConfig,
    ) -> Result<ToolConfig, CatalogError> {
        self.write(|servers| {
            let server = find_mut(servers, server_id)?;
            let tool = server
                .tool_mut(tool_name)
                .ok_or_else(|| CatalogError::ToolNotFound {
                    server: server_id.to_string(),
                    tool: tool_name.to_string(),
                })?;
            update.apply(tool);
            let updated = tool.clone();
            server.updated_at = Utc::now();
            Ok(updated)
        })
        .await
    }

    async fn sync_tools(
        &self,
        server_id: &str,
        discovered: &[ToolDescriptor],
    ) -> Result<ServerConfig, CatalogError> {
        let (server, added) = self
            .write(|servers| {
                let server = find_mut(servers, server_id)?;
                let added = server.sync_tools(discovered);
                Ok((server.clone(), added))
            })
            .await?;

        tracing::info!(
            server_id = %server.id,
            server_name = %server.name,
            discovered = discovered.len(),
            added,
            total = server.tools.len(),
            "Synced discovered tools into catalog"
        );
        Ok(server)
    }
}
