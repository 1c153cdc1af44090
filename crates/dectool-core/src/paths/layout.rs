//! File layout under the data root.

use std::path::{Path, PathBuf};

/// `<root>/catalog.json`: every server and tool config in one document.
pub fn catalog_path(root: &Path) -> PathBuf {
    root.join("catalog.json")
}

/// `<root>/results/`: one `<id>.json` file per stored tool result.
pub fn results_dir(root: &Path) -> PathBuf {
    root.join("results")
}

/// `<root>/settings.json`
pub fn settings_path(root: &Path) -> PathBuf {
    root.join("settings.json")
}
