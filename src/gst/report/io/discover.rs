use std::path::{Path, PathBuf};

use glob::{Pattern, glob};

use crate::gst::report::error::{Result, ReportError};

/// Prefix Excel gives the lock file of a workbook that is open for editing.
const LOCK_FILE_PREFIX: &str = "~$";

/// Recursively lists the `.xlsx` files below `folder`.
///
/// The order is whatever the directory walk yields; callers that need a
/// stable order must sort the result themselves.
pub fn discover_inputs(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(ReportError::MissingInput(folder.to_path_buf()));
    }

    let pattern = format!("{}/**/*.xlsx", Pattern::escape(&folder.to_string_lossy()));
    let mut inputs = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry?;
        let is_lock_file = path
            .file_name()
            .map(|name| name.to_string_lossy().starts_with(LOCK_FILE_PREFIX))
            .unwrap_or(false);
        if path.is_file() && !is_lock_file {
            inputs.push(path);
        }
    }
    Ok(inputs)
}
