//! Two-phase provisioning flow
//!
//! [`Provisioner::prepare`] validates the configuration and, in one of the
//! debug modes, ends the run early with a [`PrepareOutcome`] payload instead
//! of provisioning. [`Provisioner::provision`] then builds the manifest with OS
//! details from the target, materializes the breadcrumbs and uploads them
//! through an [`UploadSink`].

use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::PluginConfig;
use crate::constants::{TEMP_ARTIFACTS_DIR_NAME, TEMP_DIR_PREFIX};
use crate::core::BreadcrumbsError;
use crate::git::{GitRevision, RevisionProvider};
use crate::manifest::{Manifest, OptionalManifestFields};
use crate::materializer::materialize;
use crate::probe::{RemoteShell, probe_os};
use crate::utils::create_private_dir;

/// How the preparation phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// Configuration is valid and provisioning may proceed
    Ready,
    /// `debug_config`: the validated configuration as JSON
    Config(String),
    /// `debug_manifest`: the manifest as JSON
    Manifest(String),
    /// `debug_breadcrumbs`: where the breadcrumbs were written
    Breadcrumbs(PathBuf),
}

/// Transfers a local directory to the build target.
pub trait UploadSink {
    /// Uploads `source` and its contents into `destination` on the target.
    fn upload_dir(&self, source: &Path, destination: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Upload sink that copies into a directory on this machine.
///
/// Destinations are taken relative to `root`, so uploading `/tmp/x/breadcrumbs`
/// to `/` creates `<root>/breadcrumbs`.
#[derive(Debug, Clone)]
pub struct LocalDirectoryUpload {
    root: PathBuf,
}

impl LocalDirectoryUpload {
    /// Creates a sink rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }
}

impl UploadSink for LocalDirectoryUpload {
    async fn upload_dir(&self, source: &Path, destination: &str) -> Result<()> {
        let dir_name = source.file_name().ok_or_else(|| BreadcrumbsError::Other {
            message: format!("Cannot upload '{}': it has no directory name", source.display()),
        })?;
        let target_root = self.root.join(destination.trim_start_matches(['/', '\\'])).join(dir_name);

        for entry in WalkDir::new(source).follow_links(false) {
            let entry = entry.with_context(|| format!("Failed to read {}", source.display()))?;
            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            let target = target_root.join(relative);

            if entry.file_type().is_dir() {
                create_private_dir(&target).await?;
            } else if entry.file_type().is_file() {
                tokio::fs::copy(entry.path(), &target).await.with_context(|| {
                    format!("Failed to copy {} to {}", entry.path().display(), target.display())
                })?;
            }
        }

        Ok(())
    }
}

/// Runs the breadcrumbs flow for one configuration.
#[derive(Debug, Clone)]
pub struct Provisioner<R = GitRevision> {
    config: PluginConfig,
    revision: R,
    prepared: bool,
}

impl Provisioner<GitRevision> {
    /// Creates a provisioner reading revisions through git.
    #[must_use]
    pub fn new(config: PluginConfig) -> Self {
        Self::with_revision_provider(config, GitRevision)
    }
}

impl<R: RevisionProvider + Sync> Provisioner<R> {
    /// Creates a provisioner with a custom revision source.
    #[must_use]
    pub fn with_revision_provider(config: PluginConfig, revision: R) -> Self {
        Self {
            config,
            revision,
            prepared: false,
        }
    }

    /// The configuration, validated once [`prepare`](Self::prepare) succeeded.
    #[must_use]
    pub const fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Validates the configuration and runs the requested debug mode.
    ///
    /// Debug modes are checked in the order `debug_config`, `debug_manifest`,
    /// `debug_breadcrumbs`; the first enabled one decides the outcome. Debug
    /// manifests are built without OS details.
    ///
    /// # Errors
    ///
    /// Returns [`BreadcrumbsError::ConfigInvalid`] for an invalid configuration
    /// and any manifest or materialization error of the debug modes.
    pub async fn prepare(&mut self) -> Result<PrepareOutcome> {
        self.config.validate()?;
        self.prepared = true;

        if self.config.debug_config {
            return Ok(PrepareOutcome::Config(self.config.to_json()?));
        }

        if self.config.debug_manifest {
            let manifest =
                Manifest::build(&self.config, &self.revision, OptionalManifestFields::default()).await?;
            return Ok(PrepareOutcome::Manifest(manifest.to_json()?));
        }

        if self.config.debug_breadcrumbs {
            let manifest =
                Manifest::build(&self.config, &self.revision, OptionalManifestFields::default()).await?;

            let root = match &self.config.artifacts_dir_path {
                Some(dir) => dir.clone(),
                None => tempfile::Builder::new()
                    .prefix(TEMP_DIR_PREFIX)
                    .tempdir()
                    .context("Failed to create temporary artifacts directory")?
                    .keep(),
            };

            materialize(&root, &manifest, self.config.save_file_size_bytes).await?;
            tracing::info!("Created breadcrumbs at '{}'", root.display());
            return Ok(PrepareOutcome::Breadcrumbs(root));
        }

        Ok(PrepareOutcome::Ready)
    }

    /// Builds, materializes and uploads the breadcrumbs.
    ///
    /// Without an artifacts directory the breadcrumbs are written to a
    /// temporary `breadcrumbs` directory that is removed afterwards.
    ///
    /// # Errors
    ///
    /// Fails if [`prepare`](Self::prepare) has not succeeded, or with any
    /// manifest, materialization or upload error.
    pub async fn provision<S, U>(&self, shell: &S, sink: &U) -> Result<()>
    where
        S: RemoteShell + Sync,
        U: UploadSink + Sync,
    {
        if !self.prepared {
            return Err(BreadcrumbsError::ConfigInvalid {
                message: "Provisioner was not prepared".to_string(),
            }
            .into());
        }

        let optional = probe_os(shell).await;
        let manifest = Manifest::build(&self.config, &self.revision, optional).await?;

        let _temp;
        let root = if let Some(dir) = &self.config.artifacts_dir_path {
            dir.clone()
        } else {
            let temp = tempfile::Builder::new()
                .prefix(TEMP_DIR_PREFIX)
                .tempdir()
                .context("Failed to create temporary artifacts directory")?;
            let root = temp.path().join(TEMP_ARTIFACTS_DIR_NAME);
            _temp = temp;
            root
        };

        materialize(&root, &manifest, self.config.save_file_size_bytes).await?;

        tracing::info!("Uploading breadcrumbs to '{}'...", self.config.upload_dir_path);
        sink.upload_dir(&root, &self.config.upload_dir_path).await?;
        tracing::info!("Successfully uploaded breadcrumbs");

        Ok(())
    }
}
