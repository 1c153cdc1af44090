//! Settings domain types and validation.
//!
//! Settings are read from `<data_root>/settings.json`. Every field is
//! optional; unset fields fall back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default timeout for one HTTP request to a tool server.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default time to wait for one stdio response line.
pub const DEFAULT_STDIO_RESPONSE_TIMEOUT_SECS: u64 = 30;

/// MCP protocol revision sent in `initialize`.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";

/// Client name sent in `initialize`.
pub const DEFAULT_CLIENT_NAME: &str = "dectool";

const MAX_TIMEOUT_SECS: u64 = 3600;

/// Application settings structure.
///
/// All fields are optional to support partial files and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the catalog and result files. Overrides the data root.
    pub data_dir: Option<String>,

    /// Timeout in seconds for each HTTP request (1-3600).
    pub request_timeout_secs: Option<u64>,

    /// Timeout in seconds for each stdio response (1-3600).
    pub stdio_response_timeout_secs: Option<u64>,

    /// Protocol revision announced during the handshake.
    pub protocol_version: Option<String>,

    /// Client name announced during the handshake.
    pub client_name: Option<String>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            data_dir: None,
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            stdio_response_timeout_secs: Some(DEFAULT_STDIO_RESPONSE_TIMEOUT_SECS),
            protocol_version: Some(DEFAULT_PROTOCOL_VERSION.to_string()),
            client_name: Some(DEFAULT_CLIENT_NAME.to_string()),
        }
    }

    /// Load settings from `path`.
    ///
    /// A missing file yields `with_defaults()`. A present file is parsed,
    /// layered over the defaults and validated.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::with_defaults());
            }
            Err(e) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let file: Self = serde_json::from_str(&raw).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut settings = Self::with_defaults();
        settings.merge(&file.into_update());
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Get the effective request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Get the effective stdio response timeout.
    #[must_use]
    pub fn stdio_response_timeout(&self) -> Duration {
        Duration::from_secs(
            self.stdio_response_timeout_secs
                .unwrap_or(DEFAULT_STDIO_RESPONSE_TIMEOUT_SECS),
        )
    }

    #[must_use]
    pub fn effective_protocol_version(&self) -> &str {
        self.protocol_version
            .as_deref()
            .unwrap_or(DEFAULT_PROTOCOL_VERSION)
    }

    #[must_use]
    pub fn effective_client_name(&self) -> &str {
        self.client_name.as_deref().unwrap_or(DEFAULT_CLIENT_NAME)
    }

    /// Storage root: `data_dir` when set, else `fallback`.
    #[must_use]
    pub fn storage_root(&self, fallback: &Path) -> PathBuf {
        self.data_dir
            .as_deref()
            .map_or_else(|| fallback.to_path_buf(), PathBuf::from)
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref dir) = other.data_dir {
            self.data_dir.clone_from(dir);
        }
        if let Some(secs) = other.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(secs) = other.stdio_response_timeout_secs {
            self.stdio_response_timeout_secs = secs;
        }
        if let Some(ref version) = other.protocol_version {
            self.protocol_version.clone_from(version);
        }
        if let Some(ref name) = other.client_name {
            self.client_name.clone_from(name);
        }
    }

    /// Fields set in `self` become updates; unset fields are left alone.
    fn into_update(self) -> SettingsUpdate {
        SettingsUpdate {
            data_dir: self.data_dir.map(Some),
            request_timeout_secs: self.request_timeout_secs.map(Some),
            stdio_response_timeout_secs: self.stdio_response_timeout_secs.map(Some),
            protocol_version: self.protocol_version.map(Some),
            client_name: self.client_name.map(Some),
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub data_dir: Option<Option<String>>,
    pub request_timeout_secs: Option<Option<u64>>,
    pub stdio_response_timeout_secs: Option<Option<u64>>,
    pub protocol_version: Option<Option<String>>,
    pub client_name: Option<Option<String>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Timeout must be between 1 and 3600 seconds, got {0}")]
    InvalidTimeout(u64),

    #[error("Protocol version cannot be empty")]
    EmptyProtocolVersion,

    #[error("Client name cannot be empty")]
    EmptyClientName,

    #[error("Data directory cannot be empty")]
    EmptyDataDir,

    #[error("Failed to read settings file {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Invalid settings file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    for secs in [
        settings.request_timeout_secs,
        settings.stdio_response_timeout_secs,
    ]
    .into_iter()
    .flatten()
    {
        if !(1..=MAX_TIMEOUT_SECS).contains(&secs) {
            return Err(SettingsError::InvalidTimeout(secs));
        }
    }

    if settings
        .protocol_version
        .as_ref()
        .is_some_and(|v| v.trim().is_empty())
    {
        return Err(SettingsError::EmptyProtocolVersion);
    }

    if settings
        .client_name
        .as_ref()
        .is_some_and(|n| n.trim().is_empty())
    {
        return Err(SettingsError::EmptyClientName);
    }

    if settings
        .data_dir
        .as_ref()
        .is_some_and(|d| d.trim().is_empty())
    {
        return Err(SettingsError::EmptyDataDir);
    }

    Ok(())
}
