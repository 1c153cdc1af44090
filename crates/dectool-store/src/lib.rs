//! File-backed repository implementations for dectool.
//!
//! Layout under the storage root:
//!
//! - `catalog.json`: every server and tool configuration in one document
//! - `results/<id>.json`: one file per stored tool result
//!
//! Directories are created on first write and every write goes through a
//! temporary file followed by a rename.
#![deny(unsafe_code)]

mod atomic;
pub mod factory;
pub mod repositories;

pub use factory::{Repos, StoreFactory};
pub use repositories::{JsonCatalogRepository, JsonResultRepository};
