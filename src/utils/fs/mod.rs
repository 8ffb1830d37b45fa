//! File system utilities for breadcrumbs.
//!
//! # Modules
//!
//! - [`dirs`] - Owner-only directory and file creation
//! - [`discovery`] - Finding a file by base name in a directory tree
//! - [`limits`] - Size-bounded streaming copies

pub mod dirs;
pub mod discovery;
pub mod limits;

pub use dirs::{create_private_dir, create_private_file};
pub use discovery::find_file_by_name;
pub use limits::{BoundedCopyError, SizeLimiter, copy_bounded};
