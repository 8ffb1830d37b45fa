//! Operating system detection on the build target
//!
//! When a live target is available its OS is recorded in the manifest. The
//! target is only reachable through a [`RemoteShell`], so detection is a
//! sequence of shell probes:
//!
//! 1. `ls` decides the category: a start failure means unknown, exit 0 means
//!    Unix, any other exit means Windows
//! 2. Unix targets try each [`UnixProbe`] in order and stop at the first one
//!    whose command exits 0
//! 3. Windows targets run `ver`
//!
//! The version is the first run of digits and dots in the probe's output.

use anyhow::{Context, Result};
use std::future::Future;
use std::process::Stdio;
use tokio::process::Command;

use crate::manifest::OptionalManifestFields;
use crate::utils::is_windows;

/// Result of a command run through a [`RemoteShell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit status of the command
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: String,
}

impl ShellOutput {
    /// Whether the command exited 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs commands on the build target.
pub trait RemoteShell {
    /// Runs `command` and waits for it.
    ///
    /// An error means the command could not be started at all.
    fn run(&self, command: &str) -> impl Future<Output = Result<ShellOutput>> + Send;
}

/// Runs commands on this machine through `sh -c` (or `cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalShell;

impl RemoteShell for LocalShell {
    async fn run(&self, command: &str) -> Result<ShellOutput> {
        let (shell, flag) = if is_windows() { ("cmd", "/C") } else { ("sh", "-c") };

        let output = Command::new(shell)
            .args([flag, command])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to start '{command}'"))?;

        Ok(ShellOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Coarse OS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsCategory {
    /// `ls` exited 0
    Unix,
    /// `ls` started but failed
    Windows,
    /// No command could be started
    Unknown,
}

/// A Unix distribution check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnixProbe {
    /// RedHat family, including CentOS
    RedHat,
    /// Debian family, including Ubuntu
    Debian,
    /// macOS
    MacOs,
}

impl UnixProbe {
    /// Probes in the order they are tried.
    pub const ORDER: [Self; 3] = [Self::RedHat, Self::Debian, Self::MacOs];

    /// Shell command identifying the distribution.
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Self::RedHat => "cat /etc/redhat-release",
            Self::Debian => "cat /etc/issue",
            Self::MacOs => "sw_vers",
        }
    }

    /// OS name for a successful probe's output.
    #[must_use]
    pub fn os_name(self, stdout: &str) -> &'static str {
        let lower = stdout.to_lowercase();
        match self {
            Self::RedHat if lower.contains("centos") => "centos",
            Self::RedHat => "redhat",
            Self::Debian if lower.contains("ubuntu") => "ubuntu",
            Self::Debian => "debian",
            Self::MacOs => "macos",
        }
    }
}

/// Determines the target's OS category.
pub async fn os_category<S: RemoteShell + ?Sized>(shell: &S) -> OsCategory {
    match shell.run("ls").await {
        Ok(output) if output.success() => OsCategory::Unix,
        Ok(_) => OsCategory::Windows,
        Err(e) => {
            tracing::debug!("OS category probe failed: {e:#}");
            OsCategory::Unknown
        }
    }
}

/// Detects the target's OS name and version.
///
/// Fields stay unset when detection fails.
pub async fn probe_os<S: RemoteShell + ?Sized>(shell: &S) -> OptionalManifestFields {
    match os_category(shell).await {
        OsCategory::Unix => {
            for probe in UnixProbe::ORDER {
                let Ok(output) = shell.run(probe.command()).await else {
                    continue;
                };
                if !output.success() {
                    continue;
                }

                let fields = OptionalManifestFields {
                    os_name: Some(probe.os_name(&output.stdout).to_string()),
                    os_version: parse_version(&output.stdout),
                };
                tracing::debug!("Detected {:?} via {:?}", fields, probe);
                return fields;
            }
            OptionalManifestFields::default()
        }
        OsCategory::Windows => OptionalManifestFields {
            os_name: Some("windows".to_string()),
            os_version: shell.run("ver").await.ok().and_then(|output| parse_version(&output.stdout)),
        },
        OsCategory::Unknown => OptionalManifestFields::default(),
    }
}

/// Extracts a dotted version from free-form text.
///
/// Starts at the first ASCII digit and keeps digits and dots up to the first
/// other character. Returns `None` if the text has no digit.
///
/// # Examples
///
/// ```rust
/// use breadcrumbs_cli::probe::parse_version;
///
/// assert_eq!(parse_version("CentOS Linux release 7.6.1810 (Core)").as_deref(), Some("7.6.1810"));
/// assert_eq!(parse_version("no digits"), None);
/// ```
#[must_use]
pub fn parse_version(text: &str) -> Option<String> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let version: String =
        text[start..].chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
    Some(version)
}
