//! Shared utility functions.

use std::fs;
use std::path::Path;

use tokio::task::spawn_blocking;

use crate::{aflog_debug, Error, Result};

/// Run blocking store work off the async runtime.
pub async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(f)
        .await
        .map_err(|e| Error::TaskJoin(e.to_string()))?
}

/// Replace `path` with `contents`, keeping the previous version as `<path>.bak`.
///
/// The new contents land in a sibling temp file first and are renamed into
/// place, so a crash never leaves a half-written file behind.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            aflog_debug!("Creating directory: {}", dir.display());
            fs::create_dir_all(dir)?;
        }
    }

    if path.exists() {
        let backup_path = path.with_extension("json.bak");
        fs::copy(path, &backup_path)?;
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, contents)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
