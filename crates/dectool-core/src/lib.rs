//! Core domain types and port definitions for dectool.
//!
//! This crate has no network or storage implementation. Adapters live in
//! `dectool-store` (persistence) and `dectool-mcp` (protocol + orchestration).
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    AuthConfig, AuthKind, ConnectionParams, ExecutionMode, GenerationContext, NewServerConfig,
    ReferenceInfo, ResultValue, ServerConfig, StoredToolResult, ToolCall, ToolCallResult,
    ToolConfig, ToolDescriptor, ToolSelectionResult, TransportKind, UpdateToolConfig,
    infer_context_mappings,
};
pub use ports::{
    CatalogError, CredentialError, CredentialService, GenerationError, NoCredentials,
    ResultStoreError, TextGenerator, ToolCatalogRepository, ToolResultRepository,
    ToolServiceError,
};
pub use settings::{Settings, SettingsError, SettingsUpdate, validate_settings};

// Re-export path utilities
pub use paths::{
    DATA_DIR_ENV, DirectoryCreationStrategy, PathError, catalog_path, data_root,
    ensure_directory, results_dir, settings_path, verify_writable,
};

