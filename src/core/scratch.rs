//! Request-scoped scratch files for Discord uploads
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Uniquely named scratch files, removed on drop

use log::{debug, warn};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A file that exists only for the lifetime of this value.
///
/// Each instance gets its own name, so concurrent oversized responses never
/// write into each other's upload. The file is removed when the value is
/// dropped, on every exit path.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Create `dir/<prefix>-<uuid>.txt` holding `contents`
    pub async fn create(dir: &Path, prefix: &str, contents: &str) -> std::io::Result<Self> {
        let path = dir.join(format!("{prefix}-{}.txt", Uuid::new_v4()));
        // Take ownership before writing so a partial write is still cleaned up
        let file = Self { path };
        tokio::fs::write(&file.path, contents).await?;
        debug!("Wrote {} bytes to scratch file {}", contents.len(), file.path.display());
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch file {}: {e}", self.path.display()),
        }
    }
}
