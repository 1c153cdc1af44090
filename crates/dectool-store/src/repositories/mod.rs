//! Repository implementations backed by JSON files.
//!
//! File handles and on-disk formats are confined to this module and never
//! exposed through the port trait signatures.

mod json_catalog_repository;
mod json_result_repository;

pub use json_catalog_repository::JsonCatalogRepository;
pub use json_result_repository::JsonResultRepository;
