//! Platform-specific helpers.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the git command name for the current platform.
///
/// - **Windows**: `git.exe`
/// - **Unix-like**: `git`
///
/// The executable still has to be resolvable through PATH.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Resolves a configured path with tilde expansion and environment variable substitution.
///
/// # Examples
///
/// ```rust,no_run
/// use breadcrumbs_cli::utils::resolve_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let template = resolve_path("~/images/centos7.json")?;
/// let artifacts = resolve_path("$HOME/breadcrumbs")?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the home directory is unknown or a referenced environment
/// variable is not set.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path: {path}"))?;
    Ok(PathBuf::from(expanded.into_owned()))
}
