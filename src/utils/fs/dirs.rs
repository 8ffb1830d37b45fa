//! Owner-only directory and file creation.
//!
//! Breadcrumbs may contain kickstart files and scripts with credentials, so every
//! directory is created `0700` and every file `0600` on Unix. On other platforms
//! the default ACLs apply.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Directory permission bits for artifact directories.
#[cfg(unix)]
const PRIVATE_DIR_MODE: u32 = 0o700;

/// File permission bits for artifact files.
#[cfg(unix)]
const PRIVATE_FILE_MODE: u32 = 0o600;

/// Ensures a directory exists, creating it and all parents with owner-only access.
///
/// Existing directories are left untouched, including their permissions.
///
/// # Errors
///
/// Returns an error if the path exists but is not a directory, or creation fails.
pub async fn create_private_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
        }
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(PRIVATE_DIR_MODE);

    builder
        .create(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Creates (or truncates) a file for writing with owner-only access.
///
/// # Errors
///
/// Returns an error if the file cannot be opened for writing.
pub async fn create_private_file(path: &Path) -> Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(PRIVATE_FILE_MODE);

    options.open(path).await.with_context(|| format!("Failed to create file: {}", path.display()))
}
