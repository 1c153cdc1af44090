//! Paths command handler.

use dectool_core::paths::{catalog_path, results_dir, settings_path};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print every resolved path in `key = value` form.
pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    println!("data_root = {}", ctx.data_root.display());
    println!("settings = {}", settings_path(&ctx.data_root).display());
    println!("storage_root = {}", ctx.storage_root.display());
    println!("catalog = {}", catalog_path(&ctx.storage_root).display());
    println!("results = {}", results_dir(&ctx.storage_root).display());
    Ok(())
}
