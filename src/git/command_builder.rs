//! Builder for git invocations
//!
//! Breadcrumbs only ever reads from git, so the builder captures output,
//! runs with a timeout and turns failures into [`BreadcrumbsError`] values
//! carrying git's stderr.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::GIT_REVISION_TIMEOUT;
use crate::core::BreadcrumbsError;
use crate::utils::platform::get_git_command;

/// Fluent builder for a single git command.
///
/// # Examples
///
/// ```rust,no_run
/// use breadcrumbs_cli::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let head = GitCommand::current_commit()
///     .current_dir("/path/to/images")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// New commands capture output and time out after 30 seconds.
#[derive(Debug, Clone)]
pub struct GitCommand {
    /// Arguments after `git` (and after `-C <dir>` when a directory is set)
    args: Vec<String>,

    /// Directory passed with `-C`
    current_dir: Option<PathBuf>,

    /// Maximum duration to wait for the command
    timeout_duration: Duration,

    /// Label included in log messages
    context: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            timeout_duration: GIT_REVISION_TIMEOUT,
            context: None,
        }
    }
}

impl GitCommand {
    /// Creates an empty command with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the command in `dir` using git's `-C` flag.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a context for logging (e.g., the template being processed)
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// `git rev-parse HEAD`
    #[must_use]
    pub fn current_commit() -> Self {
        Self::new().args(["rev-parse", "HEAD"])
    }

    fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::new();
        if let Some(dir) = &self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    /// Execute the command and return its trimmed standard output
    ///
    /// # Errors
    ///
    /// - [`BreadcrumbsError::GitCommandError`] if git exits unsuccessfully or times out
    /// - an I/O error if git cannot be started
    pub async fn execute_stdout(self) -> Result<String> {
        let git_command = get_git_command();
        let full_args = self.full_args();
        let label = self.context.as_deref().map(|ctx| format!("({ctx}) ")).unwrap_or_default();

        tracing::debug!(
            target: "git",
            "{}Executing command: {} {}",
            label,
            git_command,
            full_args.join(" ")
        );

        let mut cmd = Command::new(git_command);
        cmd.args(&full_args).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        let duration = self.timeout_duration;
        let output = if let Ok(result) = timeout(duration, cmd.output()).await {
            result.with_context(|| format!("Failed to execute git {}", full_args.join(" ")))?
        } else {
            tracing::warn!(
                target: "git",
                "{}Command timed out after {} seconds: git {}",
                label,
                duration.as_secs(),
                full_args.join(" ")
            );
            return Err(BreadcrumbsError::GitCommandError {
                operation: self.operation(),
                stderr: format!(
                    "Git command timed out after {} seconds. Try running it manually: git {}",
                    duration.as_secs(),
                    full_args.join(" ")
                ),
            }
            .into());
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "{}Command failed with exit code: {:?}",
                label,
                output.status.code()
            );
            return Err(BreadcrumbsError::GitCommandError {
                operation: self.operation(),
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            }
            .into());
        }

        if !stdout.is_empty() {
            tracing::trace!(target: "git", "{}{}", label, stdout.trim());
        }

        Ok(stdout.trim().to_string())
    }
}
