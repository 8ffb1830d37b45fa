//! Common test utilities for breadcrumbs integration tests
//!
//! - [`TestProject`]: a temporary git repository holding a template
//! - [`TestServer`]: an in-process HTTP server with canned responses
//! - [`CommandOutput`]: captured output of the `breadcrumbs` binary

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use breadcrumbs_cli::test_utils::TestGit;
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Test project builder for creating test environments
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    output_dir: PathBuf,
    git: TestGit,
}

impl TestProject {
    /// Create a project directory initialized as a git repository
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let output_dir = temp_dir.path().join("output");

        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&output_dir)?;

        let git = TestGit::new(&project_dir);
        git.init()?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            output_dir,
            git,
        })
    }

    /// Get the project directory path
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Scratch directory outside the repository
    pub fn output_path(&self) -> &Path {
        &self.output_dir
    }

    /// Write a file relative to the project directory
    pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.project_dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write {}", file_path.display()))?;
        Ok(file_path)
    }

    /// Commit everything and return the new HEAD
    pub fn commit_all(&self, message: &str) -> Result<String> {
        self.git.commit_all(message)?;
        self.git.rev_parse_head()
    }

    /// Run the breadcrumbs binary in the project directory
    pub fn run_breadcrumbs(&self, args: &[&str]) -> Result<CommandOutput> {
        let binary = env!("CARGO_BIN_EXE_breadcrumbs");
        let output = Command::new(binary)
            .args(args)
            .current_dir(&self.project_dir)
            .env_remove("BREADCRUMBS_CONFIG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .output()
            .context("Failed to run breadcrumbs command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(self.success, "Command failed with code {:?}\nStderr: {}", self.code, self.stderr);
        self
    }

    /// Assert the command failed with exit code 1
    pub fn assert_failure(&self) -> &Self {
        assert_eq!(self.code, Some(1), "Expected failure\nStdout: {}", self.stdout);
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// Send a `Content-Length` header; without it the body ends at connection close
    pub content_length: bool,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_length: true,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: b"error".to_vec(),
            content_length: true,
        }
    }

    pub fn without_length(mut self) -> Self {
        self.content_length = false;
        self
    }
}

/// Minimal HTTP/1.1 server answering GET requests by path.
///
/// Unknown paths get a 404. Each connection serves one request.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(routes: HashMap<String, Route>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let routes = Arc::new(routes);

        let handle = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&request);
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let route = routes.get(&path).cloned().unwrap_or_else(|| Route::status(404));

                    let mut head = format!("HTTP/1.1 {} Test\r\nConnection: close\r\n", route.status);
                    if route.content_length {
                        head.push_str(&format!("Content-Length: {}\r\n", route.body.len()));
                    }
                    head.push_str("\r\n");

                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(&route.body).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Ok(Self {
            addr,
            handle,
        })
    }

    /// Absolute URL for `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Routes from `(path, route)` pairs
pub fn routes<const N: usize>(entries: [(&str, Route); N]) -> HashMap<String, Route> {
    entries.into_iter().map(|(path, route)| (path.to_string(), route)).collect()
}
