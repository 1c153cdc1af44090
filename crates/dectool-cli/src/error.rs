//! CLI error type and exit codes.

use thiserror::Error;

use dectool_core::paths::PathError;
use dectool_core::ports::{CatalogError, ResultStoreError, ToolServiceError};
use dectool_core::settings::SettingsError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// The tool server could not be reached or the tool reported an error.
    #[error("Tool error: {0}")]
    Tool(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Exit code following sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,
            Self::NotFound(_) => 66, // EX_NOINPUT
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Storage(_) | Self::Io(_) => 74, // EX_IOERR
            Self::Tool(_) => 69,     // EX_UNAVAILABLE
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) | CatalogError::ToolNotFound { .. } => {
                Self::NotFound(err.to_string())
            }
            CatalogError::Conflict(_) => Self::Arguments(err.to_string()),
            CatalogError::Internal(_) => Self::Storage(err.to_string()),
        }
    }
}

impl From<ResultStoreError> for CliError {
    fn from(err: ResultStoreError) -> Self {
        match err {
            ResultStoreError::NotFound(_) => Self::NotFound(err.to_string()),
            ResultStoreError::AlreadyExists(_) | ResultStoreError::Storage(_) => {
                Self::Storage(err.to_string())
            }
        }
    }
}

impl From<ToolServiceError> for CliError {
    fn from(err: ToolServiceError) -> Self {
        match err {
            ToolServiceError::Catalog(e) => e.into(),
            ToolServiceError::Storage(e) => e.into(),
            ToolServiceError::Configuration(_) | ToolServiceError::Credential(_) => {
                Self::Config(err.to_string())
            }
            ToolServiceError::Protocol(_) | ToolServiceError::Selection(_) => {
                Self::Tool(err.to_string())
            }
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 2);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
        assert_eq!(CliError::Tool("x".into()).exit_code(), 69);
    }

    #[test]
    fn test_service_errors_map_by_kind() {
        let missing: CliError =
            ToolServiceError::Catalog(CatalogError::NotFound("s1".into())).into();
        assert!(matches!(missing, CliError::NotFound(msg) if msg.contains("s1")));

        let config: CliError = ToolServiceError::Configuration("web: missing url".into()).into();
        assert_eq!(config.exit_code(), 78);

        let protocol: CliError = ToolServiceError::Protocol("timeout".into()).into();
        assert!(matches!(protocol, CliError::Tool(_)));

        let conflict: CliError = CatalogError::Conflict("web".into()).into();
        assert!(matches!(conflict, CliError::Arguments(_)));
    }
}
