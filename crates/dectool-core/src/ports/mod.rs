//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from
//! infrastructure and from the surrounding application.
//!
//! # Design Rules
//!
//! - No storage or HTTP types in any signature
//! - Repositories are CRUD-focused; catalog sync is the one domain operation
//! - Collaborators outside this workspace (credential store, text generation)
//!   are consumed through narrow, fallible traits

pub mod catalog_repository;
pub mod credentials;
pub mod error;
pub mod result_repository;
pub mod text_generation;

pub use catalog_repository::{CatalogError, ToolCatalogRepository};
pub use credentials::{CredentialError, CredentialService, NoCredentials};
pub use error::ToolServiceError;
pub use result_repository::{ResultStoreError, ToolResultRepository};
pub use text_generation::{GenerationError, TextGenerator};
