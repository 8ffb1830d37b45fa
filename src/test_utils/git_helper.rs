//! Git test helper utilities
//!
//! Provides a small wrapper around the git operations tests need to put a
//! template under version control.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git command builder for tests
///
/// Use this instead of raw `std::process::Command` for git operations in tests.
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    fn run_git_command(&self, args: &[&str], action: &str) -> Result<std::process::Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| action.to_string())?;

        if !output.status.success() {
            bail!("{} failed: {}", action, String::from_utf8_lossy(&output.stderr));
        }

        Ok(output)
    }

    /// Create a new TestGit instance for the given repository path
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Initialize a repository with a test identity configured
    pub fn init(&self) -> Result<()> {
        self.run_git_command(&["init", "-q"], "Failed to initialize git repository")?;
        self.run_git_command(
            &["config", "user.email", "test@breadcrumbs.example"],
            "Failed to configure git user email",
        )?;
        self.run_git_command(
            &["config", "user.name", "Test User"],
            "Failed to configure git user name",
        )?;
        Ok(())
    }

    /// Stage everything and commit it
    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.run_git_command(&["add", "."], "Failed to add files to git")?;
        self.run_git_command(&["commit", "-q", "-m", message], "Failed to create git commit")?;
        Ok(())
    }

    /// Full hash of HEAD
    pub fn rev_parse_head(&self) -> Result<String> {
        let output = self.run_git_command(&["rev-parse", "HEAD"], "Failed to read HEAD")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Path of the repository
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}
