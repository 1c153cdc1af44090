//! Platform-specific data root resolution.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "DECTOOL_DATA_DIR";

/// Get the root directory for application data (catalog, results, settings).
///
/// Resolution order:
/// 1. `DECTOOL_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/dectool`)
///
/// The directory is not created here; stores create it on first write.
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(DATA_DIR_ENV) {
        if path.trim().is_empty() {
            return Err(PathError::EmptyPath);
        }
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data_dir.join("dectool"))
}
