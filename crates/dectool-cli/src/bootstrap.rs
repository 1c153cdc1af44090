//! CLI bootstrap, the composition root.
//!
//! The only place where concrete adapters are wired together:
//! - file-backed catalog and result stores (via dectool-store)
//! - environment credential service
//! - transport factory and tool manager (via dectool-mcp)

use std::path::PathBuf;
use std::sync::Arc;

use dectool_core::Settings;
use dectool_core::paths::{DirectoryCreationStrategy, data_root, ensure_directory, settings_path};
use dectool_mcp::{ClientOptions, DefaultTransportFactory, ToolManager};
use dectool_store::{Repos, StoreFactory};

use crate::credentials::EnvCredentialService;
use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Data directory override (`--data-dir`).
    pub data_dir: Option<PathBuf>,
}

impl CliConfig {
    pub fn with_data_dir(data_dir: Option<PathBuf>) -> Self {
        Self { data_dir }
    }
}

/// Fully composed context handed to command handlers.
pub struct CliContext {
    /// Directory holding `settings.json`.
    pub data_root: PathBuf,
    /// Directory holding the catalog and results (settings may redirect it).
    pub storage_root: PathBuf,
    pub settings: Settings,
    pub repos: Repos,
    pub manager: Arc<ToolManager>,
}

/// Resolve directories, load settings and build every service.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let data_root = match config.data_dir {
        Some(dir) => dir,
        None => data_root()?,
    };
    let settings = Settings::load(&settings_path(&data_root))?;
    let storage_root = settings.storage_root(&data_root);
    ensure_directory(&storage_root, DirectoryCreationStrategy::AutoCreate)?;

    let repos = StoreFactory::build_repos(&storage_root);
    let factory = Arc::new(DefaultTransportFactory::new(ClientOptions::from_settings(
        &settings,
    )));
    let manager = Arc::new(ToolManager::new(
        repos.catalog.clone(),
        Arc::new(EnvCredentialService),
        factory,
    ));

    tracing::debug!(
        data_root = %data_root.display(),
        storage_root = %storage_root.display(),
        "CLI context ready"
    );

    Ok(CliContext {
        data_root,
        storage_root,
        settings,
        repos,
        manager,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bootstrap_with_override_creates_storage() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");

        let ctx = bootstrap(CliConfig::with_data_dir(Some(root.clone()))).unwrap();
        assert_eq!(ctx.data_root, root);
        assert_eq!(ctx.storage_root, root);
        assert!(root.is_dir());
        assert_eq!(ctx.settings, Settings::with_defaults());
    }

    #[test]
    fn test_settings_redirect_storage() {
        let tmp = TempDir::new().unwrap();
        let storage = tmp.path().join("elsewhere");
        std::fs::write(
            tmp.path().join("settings.json"),
            format!(
                r#"{{"data_dir": {}, "request_timeout_secs": 5}}"#,
                serde_json::to_string(&storage.display().to_string()).unwrap()
            ),
        )
        .unwrap();

        let ctx = bootstrap(CliConfig::with_data_dir(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(ctx.storage_root, storage);
        assert!(storage.is_dir());
        assert_eq!(ctx.settings.request_timeout_secs, Some(5));
    }

    #[test]
    fn test_invalid_settings_are_a_config_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("settings.json"), r#"{"request_timeout_secs": 0}"#).unwrap();

        let err = bootstrap(CliConfig::with_data_dir(Some(tmp.path().to_path_buf())))
            .err()
            .unwrap();
        assert!(matches!(err, CliError::Config(_)));
    }
}
