//! Cross-platform utilities for breadcrumbs
//!
//! # Modules
//!
//! - [`fs`] - Private directory creation, bounded copies and file lookup
//! - [`platform`] - Platform detection, git command name and path expansion
//!
//! The crate-wide content-addressing primitive, [`hash_bytes`], and the JSON
//! writer shared by the manifest and the config dump, [`to_indented_json`],
//! also live here.

pub mod fs;
pub mod platform;

pub use fs::{SizeLimiter, copy_bounded, create_private_dir, create_private_file, find_file_by_name};
pub use platform::{get_git_command, is_windows, resolve_path};

/// Content-address a byte string.
///
/// Returns the lowercase hexadecimal SHA-256 digest of `bytes`. Breadcrumbs use
/// it to name stored artifacts after the path or URL they were found at, which keeps
/// names collision-free and stops hostile paths from escaping the artifact tree.
///
/// # Examples
///
/// ```rust
/// use breadcrumbs_cli::utils::hash_bytes;
///
/// let id = hash_bytes(b"scripts/ks.ks");
/// assert_eq!(id.len(), 64);
/// assert_eq!(id, hash_bytes(b"scripts/ks.ks"));
/// ```
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Serializes `value` as JSON indented with four spaces, followed by a newline.
///
/// # Errors
///
/// Returns an error if `value` cannot be represented as JSON.
pub fn to_indented_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(crate::constants::JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(String::from_utf8(buf)?)
}
