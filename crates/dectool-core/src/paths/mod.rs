//! Path utilities for dectool data directories.
//!
//! This module provides the canonical path resolution for the stores:
//! - Data root (env override or platform data directory)
//! - Catalog file
//! - Results directory
//! - Settings file
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - File layout helpers are pure functions of the root so tests can point
//!   them at a temporary directory

mod ensure;
mod error;
mod layout;
mod platform;

#[cfg(test)]
mod test_utils;

// Error type
pub use error::PathError;

// Roots
pub use platform::{DATA_DIR_ENV, data_root};

// File layout under the root
pub use layout::{catalog_path, results_dir, settings_path};

// Directory operations
pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};
