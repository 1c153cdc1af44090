//! Composition utilities for building the file-backed repositories.

use std::path::Path;
use std::sync::Arc;

use dectool_core::paths::{catalog_path, results_dir};
use dectool_core::ports::{ToolCatalogRepository, ToolResultRepository};

use crate::repositories::{JsonCatalogRepository, JsonResultRepository};

/// Trait-object-wrapped repositories handed to services.
#[derive(Clone)]
pub struct Repos {
    pub catalog: Arc<dyn ToolCatalogRepository>,
    pub results: Arc<dyn ToolResultRepository>,
}

/// Factory for repository instances rooted at one storage directory.
///
/// Construction performs no I/O.
pub struct StoreFactory;

impl StoreFactory {
    /// Build both repositories under `root`.
    pub fn build_repos(root: &Path) -> Repos {
        Repos {
            catalog: Arc::new(JsonCatalogRepository::new(catalog_path(root))),
            results: Arc::new(JsonResultRepository::new(results_dir(root))),
        }
    }
}
