//! Configuration for breadcrumbs
//!
//! A [`PluginConfig`] describes one provisioning run: which template to scan,
//! which suffixes mark a file reference, where artifacts go and how large they
//! may be. It is loaded from a TOML file, adjusted with command-line
//! [`ConfigOverrides`] and then checked once with [`PluginConfig::validate`].
//! After validation the configuration is read-only.
//!
//! # Configuration File
//!
//! ```toml
//! template_path = "~/images/centos7/centos7.json"
//! include_suffixes = [".ks", ".sh"]
//! artifacts_dir_path = "$HOME/breadcrumbs"
//! upload_dir_path = "/"
//! template_size_bytes = 100000
//! save_file_size_bytes = 100000
//! packer_build_name = "centos7"
//! packer_builder_type = "virtualbox-iso"
//!
//! [packer_user_variables]
//! version = "0.0.1"
//! ```
//!
//! `~` and environment variables in `template_path` and `artifacts_dir_path`
//! are expanded during validation. The project directory is always the
//! template's parent directory and cannot be configured.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{DEFAULT_SAVE_FILE_SIZE_BYTES, DEFAULT_TEMPLATE_SIZE_BYTES, DEFAULT_UPLOAD_DIR};
use crate::core::BreadcrumbsError;
use crate::utils::{resolve_path, to_indented_json};

/// Settings for one breadcrumbs run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Build template to scan
    #[serde(alias = "packer_template_path")]
    pub template_path: PathBuf,

    /// Suffixes marking file references, scanned in order
    pub include_suffixes: Vec<String>,

    /// Where artifacts are materialized; a temporary directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_dir_path: Option<PathBuf>,

    /// Destination of the upload on the target
    pub upload_dir_path: String,

    /// Maximum template size in bytes (0 selects the default)
    pub template_size_bytes: u64,

    /// Maximum size of each saved file in bytes (0 selects the default)
    pub save_file_size_bytes: u64,

    /// Print the validated configuration and stop
    pub debug_config: bool,

    /// Print the manifest and stop
    pub debug_manifest: bool,

    /// Materialize the artifacts locally and stop
    pub debug_breadcrumbs: bool,

    /// Name of the build
    pub packer_build_name: String,

    /// Type of the builder
    pub packer_builder_type: String,

    /// Values for `{{ user `name` }}` and `{{ .Name }}` variables
    pub packer_user_variables: BTreeMap<String, String>,

    /// Version recorded in the manifest (this crate's version when blank)
    pub plugin_version: String,

    #[serde(skip)]
    project_dir: PathBuf,
}

/// Command-line values that replace configuration file values.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub template_path: Option<PathBuf>,
    /// Replaces the configured suffixes when non-empty
    pub include_suffixes: Vec<String>,
    /// Merged into the configured variables, replacing equal keys
    pub user_variables: Vec<(String, String)>,
    pub artifacts_dir_path: Option<PathBuf>,
    pub upload_dir_path: Option<String>,
    pub template_size_bytes: Option<u64>,
    pub save_file_size_bytes: Option<u64>,
    pub packer_build_name: Option<String>,
    pub packer_builder_type: Option<String>,
}

impl PluginConfig {
    /// Loads a configuration file.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use breadcrumbs_cli::config::PluginConfig;
    /// use std::path::Path;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let mut config = PluginConfig::load_from(Path::new("breadcrumbs.toml")).await?;
    /// config.validate()?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this structure.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Loads `path` when given, otherwise starts from an empty configuration.
    ///
    /// # Errors
    ///
    /// See [`PluginConfig::load_from`].
    pub async fn load_with_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path).await,
            None => Ok(Self::default()),
        }
    }

    /// Applies command-line overrides.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(template_path) = overrides.template_path {
            self.template_path = template_path;
        }
        if !overrides.include_suffixes.is_empty() {
            self.include_suffixes = overrides.include_suffixes;
        }
        self.packer_user_variables.extend(overrides.user_variables);
        if let Some(dir) = overrides.artifacts_dir_path {
            self.artifacts_dir_path = Some(dir);
        }
        if let Some(dir) = overrides.upload_dir_path {
            self.upload_dir_path = dir;
        }
        if let Some(limit) = overrides.template_size_bytes {
            self.template_size_bytes = limit;
        }
        if let Some(limit) = overrides.save_file_size_bytes {
            self.save_file_size_bytes = limit;
        }
        if let Some(name) = overrides.packer_build_name {
            self.packer_build_name = name;
        }
        if let Some(builder) = overrides.packer_builder_type {
            self.packer_builder_type = builder;
        }
    }

    /// Checks required values, expands paths and applies defaults.
    ///
    /// After a successful call:
    /// - the template path is expanded and the project directory is its parent
    ///   (`.` for a bare file name)
    /// - a blank upload directory is `/`
    /// - zero size limits are 100,000 bytes
    /// - a blank artifacts directory is unset
    ///
    /// # Errors
    ///
    /// Returns [`BreadcrumbsError::ConfigInvalid`] if the template path is
    /// blank, a path cannot be expanded, or a suffix is empty.
    pub fn validate(&mut self) -> Result<(), BreadcrumbsError> {
        if self.template_path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(BreadcrumbsError::ConfigInvalid {
                message: "Failed to get template path".to_string(),
            });
        }
        self.template_path = expand(&self.template_path)?;

        self.project_dir = match self.template_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if let Some(position) = self.include_suffixes.iter().position(String::is_empty) {
            return Err(BreadcrumbsError::ConfigInvalid {
                message: format!("Include suffix #{} is empty", position + 1),
            });
        }

        self.artifacts_dir_path = match self.artifacts_dir_path.take() {
            Some(dir) if !dir.as_os_str().to_string_lossy().trim().is_empty() => Some(expand(&dir)?),
            _ => None,
        };

        if self.upload_dir_path.trim().is_empty() {
            self.upload_dir_path = DEFAULT_UPLOAD_DIR.to_string();
        }
        if self.template_size_bytes == 0 {
            self.template_size_bytes = DEFAULT_TEMPLATE_SIZE_BYTES;
        }
        if self.save_file_size_bytes == 0 {
            self.save_file_size_bytes = DEFAULT_SAVE_FILE_SIZE_BYTES;
        }
        if self.plugin_version.trim().is_empty() {
            self.plugin_version = env!("CARGO_PKG_VERSION").to_string();
        }

        Ok(())
    }

    /// Directory relative references resolve against. Empty before [`validate`](Self::validate).
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Serializes the configuration as 4-space indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        to_indented_json(self)
    }
}

fn expand(path: &Path) -> Result<PathBuf, BreadcrumbsError> {
    let Some(text) = path.to_str() else {
        return Ok(path.to_path_buf());
    };
    resolve_path(text).map_err(|e| BreadcrumbsError::ConfigInvalid {
        message: format!("{e:#}"),
    })
}
