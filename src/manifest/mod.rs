//! Breadcrumb manifest model.
//!
//! A [`Manifest`] is the metadata record written as `breadcrumbs.json` at the
//! root of the artifact tree. It lists every file reference found in the build
//! template as a [`FileReference`] and carries the build context: plugin
//! version, git revision, build name and type, user variables and, when a live
//! target was probed, its operating system.
//!
//! Manifests are assembled by [`Manifest::build`] (see [`builder`]) and are
//! immutable afterwards.
//!
//! # JSON Format
//!
//! ```json
//! {
//!     "plugin_version": "0.3.0",
//!     "git_revision": "3f1c...",
//!     "packer_build_name": "centos7",
//!     "packer_build_type": "virtualbox-iso",
//!     "packer_user_variables": {
//!         "version": "0.0.1"
//!     },
//!     "os_name": "centos",
//!     "os_version": "7.6.1810",
//!     "include_suffixes": [".ks"],
//!     "packer_template_path": "9a2b...",
//!     "found_files": [
//!         {
//!             "name": "packer-generic.ks",
//!             "found_at_path": "https://cool.com/centos/7/packer-generic.ks",
//!             "stored_at_path": "5d4e...",
//!             "source": "https_host"
//!         }
//!     ]
//! }
//! ```

pub mod builder;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{HTTP_PREFIX, HTTPS_PREFIX};
use crate::utils::{hash_bytes, to_indented_json};

pub use builder::discover_references;

/// Where a referenced file is obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSource {
    /// Not yet classified; only unresolved references carry it
    #[default]
    Unknown,
    /// A path on the local file system
    LocalStorage,
    /// An `http://` URL
    HttpHost,
    /// An `https://` URL
    HttpsHost,
}

impl FileSource {
    /// Classifies a resolved reference by its scheme prefix.
    #[must_use]
    pub fn classify(path: &str) -> Self {
        if path.starts_with(HTTP_PREFIX) {
            Self::HttpHost
        } else if path.starts_with(HTTPS_PREFIX) {
            Self::HttpsHost
        } else {
            Self::LocalStorage
        }
    }

    /// The serialized name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::LocalStorage => "local_storage",
            Self::HttpHost => "http_host",
            Self::HttpsHost => "https_host",
        }
    }
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file referenced by the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Base name of the reference
    pub name: String,
    /// Path or URL as found in the template, after variable resolution
    pub found_at_path: String,
    /// Content-addressed identifier and on-disk name of the stored copy
    pub stored_at_path: String,
    /// How the file is obtained
    pub source: FileSource,
    #[serde(skip)]
    unresolved: bool,
}

impl FileReference {
    /// Builds a resolved reference, classifying and hashing `path`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use breadcrumbs_cli::manifest::{FileReference, FileSource};
    ///
    /// let reference = FileReference::new("https://x.com/a.ks");
    /// assert_eq!(reference.name, "a.ks");
    /// assert_eq!(reference.source, FileSource::HttpsHost);
    /// assert_eq!(reference.stored_at_path.len(), 64);
    /// ```
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let found_at_path = path.into();
        let name = Path::new(&found_at_path)
            .file_name()
            .map_or_else(|| found_at_path.clone(), |name| name.to_string_lossy().into_owned());

        Self {
            name,
            stored_at_path: hash_bytes(found_at_path.as_bytes()),
            source: FileSource::classify(&found_at_path),
            found_at_path,
            unresolved: false,
        }
    }

    /// Records a reference that still contains variable syntax.
    #[must_use]
    pub fn unresolved(raw: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            found_at_path: raw.into(),
            stored_at_path: String::new(),
            source: FileSource::Unknown,
            unresolved: true,
        }
    }

    /// Whether the reference still needs variable resolution.
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        self.unresolved
    }

    /// Directory the stored copy is written to under `root`.
    #[must_use]
    pub fn destination_dir(&self, root: &Path) -> PathBuf {
        let destination = self.destination_path(root);
        destination.parent().map_or_else(|| root.to_path_buf(), Path::to_path_buf)
    }

    /// Full path of the stored copy under `root`.
    #[must_use]
    pub fn destination_path(&self, root: &Path) -> PathBuf {
        root.join(&self.stored_at_path)
    }
}

/// Facts about the target machine, known only when a live target was probed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalManifestFields {
    /// Distribution or OS family (`centos`, `ubuntu`, `macos`, `windows`, ...)
    pub os_name: Option<String>,
    /// Dotted version string
    pub os_version: Option<String>,
}

/// The breadcrumb metadata record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Version of the tool that wrote the manifest
    pub plugin_version: String,
    /// Revision of the repository holding the template
    pub git_revision: String,
    /// Packer build name
    pub packer_build_name: String,
    /// Packer builder type, e.g. `virtualbox-iso`
    pub packer_build_type: String,
    /// User variables used for resolution
    pub packer_user_variables: BTreeMap<String, String>,
    /// Target OS name, when the target was probed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    /// Target OS version, when the target was probed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// Suffixes the template was scanned for
    pub include_suffixes: Vec<String>,
    /// Content-addressed identifier of the template's base name
    pub packer_template_path: String,
    /// References in suffix order, then scan order
    pub found_files: Vec<FileReference>,
    #[serde(skip)]
    template_raw: Vec<u8>,
    #[serde(skip)]
    project_dir: PathBuf,
}

impl Manifest {
    /// Raw template bytes, stored next to the manifest when materializing.
    #[must_use]
    pub fn template_raw(&self) -> &[u8] {
        &self.template_raw
    }

    /// Directory relative local references resolve against.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Resolves a local reference's `found_at_path` to the file to read.
    #[must_use]
    pub fn local_source_path(&self, reference: &FileReference) -> PathBuf {
        let path = Path::new(&reference.found_at_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Serializes the manifest as 4-space indented JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> anyhow::Result<String> {
        to_indented_json(self)
    }
}
