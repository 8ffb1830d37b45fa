//! Error handling for breadcrumbs
//!
//! This module provides the strongly-typed error enum used by every stage of the
//! pipeline and the user-facing error presentation used by the CLI.
//!
//! # Architecture
//!
//! - [`BreadcrumbsError`] - Enumerated failure cases (configuration, size limits,
//!   variable resolution, fetching, git)
//! - [`ErrorContext`] - Wrapper adding a details line and an actionable suggestion
//!
//! Use [`user_friendly_error`] to turn any [`anyhow::Error`] into an [`ErrorContext`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use breadcrumbs_cli::core::{BreadcrumbsError, user_friendly_error};
//!
//! let error = BreadcrumbsError::TemplateTooLarge {
//!     path: "centos7.json".to_string(),
//!     limit: 100_000,
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for breadcrumbs operations
///
/// Every fatal condition of the manifest build and the materialization has its own
/// variant carrying the path, URL, limit or status code needed to diagnose it
/// without re-running.
///
/// # Error Categories
///
/// ## Configuration
/// - [`ConfigInvalid`] - Required configuration is missing or malformed
///
/// ## Size Limits
/// - [`TemplateTooLarge`] - The build template exceeds its configured maximum
/// - [`FileTooLarge`] - A referenced file or URL body exceeds the save limit
///
/// ## Variable Resolution
/// - [`UnknownVariableType`] - A `{{ ... }}` span is neither a user nor a special variable
/// - [`MissingVariable`] - A variable has no value and the disk fallback was not applied
/// - [`FileNotFound`] - The disk fallback found no file with the requested name
/// - [`DirectoryWalk`] - The disk fallback could not read the project tree
///
/// ## Fetching
/// - [`FetchFailed`] - An HTTP server answered with a status other than 200
/// - [`NetworkError`] - The HTTP request could not be completed
/// - [`UnknownFileSource`] - A reference without a usable source reached the materializer
///
/// ## Git
/// - [`GitNotFound`] - The git executable is not available
/// - [`GitCommandError`] - A git command failed or timed out
///
/// [`ConfigInvalid`]: BreadcrumbsError::ConfigInvalid
/// [`TemplateTooLarge`]: BreadcrumbsError::TemplateTooLarge
/// [`FileTooLarge`]: BreadcrumbsError::FileTooLarge
/// [`UnknownVariableType`]: BreadcrumbsError::UnknownVariableType
/// [`MissingVariable`]: BreadcrumbsError::MissingVariable
/// [`FileNotFound`]: BreadcrumbsError::FileNotFound
/// [`DirectoryWalk`]: BreadcrumbsError::DirectoryWalk
/// [`FetchFailed`]: BreadcrumbsError::FetchFailed
/// [`NetworkError`]: BreadcrumbsError::NetworkError
/// [`UnknownFileSource`]: BreadcrumbsError::UnknownFileSource
/// [`GitNotFound`]: BreadcrumbsError::GitNotFound
/// [`GitCommandError`]: BreadcrumbsError::GitCommandError
#[derive(Error, Debug)]
pub enum BreadcrumbsError {
    /// Configuration is missing a required value or has an invalid one
    #[error("Configuration error: {message}")]
    ConfigInvalid {
        /// Description of the configuration problem
        message: String,
    },

    /// Build template is larger than `template_size_bytes`
    #[error("Template file '{path}' size exceeds maximum size of {limit} byte(s)")]
    TemplateTooLarge {
        /// Path to the offending template
        path: String,
        /// The configured maximum in bytes
        limit: u64,
    },

    /// A breadcrumb source is larger than `save_file_size_bytes`
    #[error("File '{source_path}' exceeds maximum size of {limit} byte(s)")]
    FileTooLarge {
        /// Local path or URL of the oversized source
        source_path: String,
        /// The configured maximum in bytes
        limit: u64,
    },

    /// A template variable span has an unrecognized shape
    #[error("Unknown template variable type in '{raw}'")]
    UnknownVariableType {
        /// The raw `{{ ... }}` text
        raw: String,
    },

    /// A template variable has no known value
    #[error("Template variable '{name}' does not exist in the provided variables")]
    MissingVariable {
        /// Name of the variable
        name: String,
    },

    /// The disk fallback could not locate a file
    #[error("Failed to find file '{name}' in '{dir}'")]
    FileNotFound {
        /// Base name that was searched for
        name: String,
        /// Directory the search started from
        dir: String,
    },

    /// Walking the project tree failed
    #[error("Failed to walk directory '{dir}': {source}")]
    DirectoryWalk {
        /// Directory the walk started from
        dir: String,
        /// Underlying walk error
        #[source]
        source: walkdir::Error,
    },

    /// HTTP server returned a non-200 status
    #[error("Failed to GET http file '{url}' - got status code {status}")]
    FetchFailed {
        /// Requested URL
        url: String,
        /// Status code returned by the server
        status: u16,
    },

    /// HTTP request could not be completed
    #[error("Network error fetching '{url}': {reason}")]
    NetworkError {
        /// Requested URL
        url: String,
        /// Transport-level reason
        reason: String,
    },

    /// A reference with no usable source reached the materializer
    #[error("Unknown file source '{source_name}' for '{path}'")]
    UnknownFileSource {
        /// Serialized name of the source
        source_name: String,
        /// The reference's found-at path
        path: String,
    },

    /// Git executable not found in PATH
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Git command failed
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g. "rev-parse")
        operation: String,
        /// Error output of the git command
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show the main message in red, details in yellow and
/// the suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BreadcrumbsError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: BreadcrumbsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`BreadcrumbsError`] anywhere in the error chain and falls back to
/// printing the full chain for everything else.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(known) = error.chain().find_map(|cause| cause.downcast_ref::<BreadcrumbsError>()) {
        let context = describe(known);
        let message = full_chain(&error);
        return ErrorContext {
            error: BreadcrumbsError::Other {
                message,
            },
            ..context
        };
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(BreadcrumbsError::Other {
                message: full_chain(&error),
            })
            .with_suggestion("Check ownership and permissions of the template and artifact directories");
        }
    }

    ErrorContext::new(BreadcrumbsError::Other {
        message: full_chain(&error),
    })
}

fn full_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

/// Suggestions and details for each known error kind.
fn describe(error: &BreadcrumbsError) -> ErrorContext {
    let blank = || {
        ErrorContext::new(BreadcrumbsError::Other {
            message: String::new(),
        })
    };

    match error {
        BreadcrumbsError::ConfigInvalid {
            ..
        } => blank()
            .with_suggestion("Set 'template_path' in the config file or pass --template")
            .with_details("The project directory is derived from the template path"),
        BreadcrumbsError::TemplateTooLarge {
            limit,
            ..
        } => blank()
            .with_suggestion("Raise 'template_size_bytes' in the configuration")
            .with_details(format!("The current limit is {limit} byte(s)")),
        BreadcrumbsError::FileTooLarge {
            limit,
            ..
        } => blank()
            .with_suggestion("Raise 'save_file_size_bytes' or drop the suffix that matched this file")
            .with_details(format!("Breadcrumb files are capped at {limit} byte(s)")),
        BreadcrumbsError::UnknownVariableType {
            ..
        } => blank()
            .with_suggestion("Only {{ user `name` }} and {{ .Name }} variables can be resolved")
            .with_details("The reference was found while scanning the template"),
        BreadcrumbsError::MissingVariable {
            name,
        } => blank().with_suggestion(format!("Pass a value for '{name}' with --var {name}=VALUE")),
        BreadcrumbsError::FileNotFound {
            ..
        } => blank()
            .with_suggestion("Provide the variable value with --var, or make sure the file exists under the project directory")
            .with_details("Files behind unresolved variables are searched for by name"),
        BreadcrumbsError::DirectoryWalk {
            ..
        } => blank().with_suggestion("Check permissions of the project directory tree"),
        BreadcrumbsError::FetchFailed {
            status,
            ..
        } => blank()
            .with_suggestion("Check that the URL in the template is reachable")
            .with_details(format!("The server answered with HTTP {status}")),
        BreadcrumbsError::NetworkError {
            ..
        } => blank().with_suggestion("Check network connectivity and proxy settings"),
        BreadcrumbsError::UnknownFileSource {
            ..
        } => blank().with_details("This is a bug: every reference must be resolved before materializing"),
        BreadcrumbsError::GitNotFound => blank()
            .with_suggestion("Install git from https://git-scm.com/ and make sure it is in PATH"),
        BreadcrumbsError::GitCommandError {
            stderr,
            ..
        } => blank()
            .with_suggestion("The template must live inside a git repository with at least one commit")
            .with_details(stderr.trim().to_string()),
        BreadcrumbsError::IoError(_) | BreadcrumbsError::Other {
            ..
        } => blank(),
    }
}
