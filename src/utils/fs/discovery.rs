//! Finding files by base name in a directory tree.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::BreadcrumbsError;

/// Recursively finds the regular file named exactly `file_name` under `dir`.
///
/// Returns the match's path relative to `dir`. When several files share the
/// name, the shallowest one wins and ties at the same depth are broken by
/// lexical order of the relative path, so the result never depends on the
/// order the file system lists entries in.
///
/// # Errors
///
/// - [`BreadcrumbsError::DirectoryWalk`] if any part of the tree cannot be read
///   (including a missing `dir`)
/// - [`BreadcrumbsError::FileNotFound`] if no file matches
///
/// # Examples
///
/// ```rust,no_run
/// use breadcrumbs_cli::utils::find_file_by_name;
/// use std::path::Path;
///
/// # fn example() -> Result<(), breadcrumbs_cli::core::BreadcrumbsError> {
/// let relative = find_file_by_name("ks.ks", Path::new("/home/me/images"))?;
/// // e.g. "scripts/ks.ks"
/// # Ok(())
/// # }
/// ```
pub fn find_file_by_name(file_name: &str, dir: &Path) -> Result<PathBuf, BreadcrumbsError> {
    let mut matches: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|source| BreadcrumbsError::DirectoryWalk {
            dir: dir.display().to_string(),
            source,
        })?;

        if !entry.file_type().is_file() || entry.file_name() != file_name {
            continue;
        }

        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path()).to_path_buf();
        matches.push(relative);
    }

    matches.sort_by(|a, b| {
        a.components().count().cmp(&b.components().count()).then_with(|| a.cmp(b))
    });

    if matches.len() > 1 {
        tracing::warn!(
            target: "resolver",
            "Found {} files named '{}' under '{}', using '{}' (also: {})",
            matches.len(),
            file_name,
            dir.display(),
            matches[0].display(),
            matches[1..].iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
        );
    }

    matches.into_iter().next().ok_or_else(|| BreadcrumbsError::FileNotFound {
        name: file_name.to_string(),
        dir: dir.display().to_string(),
    })
}
