//! Core types for breadcrumbs
//!
//! This module holds the error layer shared by every stage of the pipeline:
//! - [`BreadcrumbsError`] - Enumerated error types covering every failure mode
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! # Examples
//!
//! ```rust
//! use breadcrumbs_cli::core::{BreadcrumbsError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(BreadcrumbsError::GitNotFound.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{BreadcrumbsError, ErrorContext, user_friendly_error};
