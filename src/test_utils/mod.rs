//! Test utilities for breadcrumbs
//!
//! Helpers shared by unit and integration tests:
//! - one-time tracing setup for test output
//! - [`StaticRevision`] and [`ScriptedShell`], stand-ins for git and a live build target
//! - template and configuration fixtures
//! - [`TestGit`] for putting a template under version control
//!
//! # Example
//!
//! ```rust,no_run
//! use breadcrumbs_cli::test_utils::ScriptedShell;
//!
//! let shell = ScriptedShell::new()
//!     .respond("ls", 0, "")
//!     .respond("cat /etc/issue", 0, "Debian GNU/Linux 9");
//! ```

pub mod fixtures;
pub mod git_helper;

pub use git_helper::TestGit;

use anyhow::{Result, bail};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::git::RevisionProvider;
use crate::probe::{RemoteShell, ShellOutput};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` if given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            crate::cli::log_filter(level)
        } else if let Ok(filter) = EnvFilter::try_from_default_env() {
            filter
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// A [`RevisionProvider`] returning a fixed revision.
#[derive(Debug, Clone)]
pub struct StaticRevision {
    revision: String,
}

impl StaticRevision {
    pub fn new(revision: &str) -> Self {
        Self {
            revision: revision.to_string(),
        }
    }
}

impl RevisionProvider for StaticRevision {
    async fn current_revision(&self, _project_dir: &Path) -> Result<String> {
        Ok(self.revision.clone())
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Output(ShellOutput),
    StartFailure,
}

/// A [`RemoteShell`] answering from a script.
///
/// Commands without a scripted answer exit 127 with no output, like a shell
/// that cannot find the program. Every command run is recorded.
#[derive(Debug, Default)]
pub struct ScriptedShell {
    responses: HashMap<String, Scripted>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `command` with `exit_code` and `stdout`.
    #[must_use]
    pub fn respond(mut self, command: &str, exit_code: i32, stdout: &str) -> Self {
        self.responses.insert(
            command.to_string(),
            Scripted::Output(ShellOutput {
                exit_code,
                stdout: stdout.to_string(),
            }),
        );
        self
    }

    /// Makes `command` fail to start.
    #[must_use]
    pub fn fail(mut self, command: &str) -> Self {
        self.responses.insert(command.to_string(), Scripted::StartFailure);
        self
    }

    /// Commands run so far, oldest first.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl RemoteShell for ScriptedShell {
    async fn run(&self, command: &str) -> Result<ShellOutput> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.to_string());
        }

        match self.responses.get(command) {
            Some(Scripted::Output(output)) => Ok(output.clone()),
            Some(Scripted::StartFailure) => bail!("Failed to start '{command}'"),
            None => Ok(ShellOutput {
                exit_code: 127,
                stdout: String::new(),
            }),
        }
    }
}
