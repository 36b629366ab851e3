//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

use crate::errors::{io_error, Result};
use std::fs;
use std::path::Path;

/// Atomically write bytes to a file, creating parent directories
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create_output_dir", e))?;
    }

    let temp_path = target_path.with_extension("tmp");

    fs::write(&temp_path, content).map_err(|e| io_error("write_output_temp", e))?;
    fs::rename(&temp_path, target_path).map_err(|e| io_error("rename_output_temp", e))?;

    Ok(())
}
