//! Global constants used throughout the breadcrumbs codebase.
//!
//! Size limits, timeouts and file names that are shared between the
//! configuration layer, the manifest builder and the materializer.

use std::time::Duration;

/// Default maximum size of a build template in bytes.
///
/// Applied when `template_size_bytes` is unset or zero.
pub const DEFAULT_TEMPLATE_SIZE_BYTES: u64 = 100_000;

/// Default maximum size of a single saved breadcrumb file in bytes.
///
/// Applied when `save_file_size_bytes` is unset or zero.
pub const DEFAULT_SAVE_FILE_SIZE_BYTES: u64 = 100_000;

/// Client timeout for fetching an HTTP(S) breadcrumb (30 seconds).
pub const HTTP_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the `git rev-parse` call (30 seconds).
pub const GIT_REVISION_TIMEOUT: Duration = Duration::from_secs(30);

/// Name of the manifest file written at the root of the artifact tree.
pub const MANIFEST_FILE_NAME: &str = "breadcrumbs.json";

/// Prefix of temporary artifact directories.
pub const TEMP_DIR_PREFIX: &str = "breadcrumbs-";

/// Name of the artifact directory created inside a temporary directory.
pub const TEMP_ARTIFACTS_DIR_NAME: &str = "breadcrumbs";

/// Upload destination used when none is configured.
pub const DEFAULT_UPLOAD_DIR: &str = "/";

/// Indentation used for every JSON document this crate writes.
pub const JSON_INDENT: &[u8] = b"    ";

/// Scheme prefix of plain HTTP references.
pub const HTTP_PREFIX: &str = "http://";

/// Scheme prefix of HTTPS references.
pub const HTTPS_PREFIX: &str = "https://";

/// Log targets used by the pipeline stages, in addition to the crate's module paths.
pub const LOG_TARGETS: &[&str] = &["scanner", "resolver", "materialize", "git"];
