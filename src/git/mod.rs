//! Source-control revision lookup
//!
//! The manifest records the revision of the repository holding the build
//! template. [`RevisionProvider`] is the seam the manifest builder depends on;
//! [`GitRevision`] implements it with the system `git` binary, the same way
//! Cargo's `git-fetch-with-cli` shells out instead of embedding a git library.
//!
//! # Examples
//!
//! ```rust,no_run
//! use breadcrumbs_cli::git::{GitRevision, RevisionProvider};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let revision = GitRevision.current_revision(Path::new("/path/to/images")).await?;
//! println!("building from {revision}");
//! # Ok(())
//! # }
//! ```

pub mod command_builder;

use anyhow::Result;
use std::future::Future;
use std::path::Path;

use crate::core::BreadcrumbsError;
use crate::utils::platform::get_git_command;
use command_builder::GitCommand;

/// Supplies the current source-control revision of a directory.
pub trait RevisionProvider {
    /// Returns the revision identifier of the repository containing `project_dir`.
    fn current_revision(&self, project_dir: &Path) -> impl Future<Output = Result<String>> + Send;
}

/// Revision lookup through `git rev-parse HEAD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitRevision;

impl RevisionProvider for GitRevision {
    async fn current_revision(&self, project_dir: &Path) -> Result<String> {
        if which::which(get_git_command()).is_err() {
            return Err(BreadcrumbsError::GitNotFound.into());
        }

        let revision = GitCommand::current_commit()
            .current_dir(project_dir)
            .with_context("revision")
            .execute_stdout()
            .await?;

        tracing::debug!(target: "git", "Current revision of '{}' is {}", project_dir.display(), revision);
        Ok(revision)
    }
}
