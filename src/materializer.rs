//! Writing breadcrumbs to disk
//!
//! [`materialize`] turns a [`Manifest`] into an artifact tree:
//!
//! ```text
//! <root>/
//! ├── breadcrumbs.json          manifest, 4-space indented
//! ├── <sha256 of template name> raw template bytes
//! └── <sha256 of found path>    one file per reference
//! ```
//!
//! Local references are streamed from disk and URL references are fetched
//! with a GET request. Both go through a [`SizeLimiter`], so no stored file
//! exceeds `max_file_size_bytes`; a source over the limit fails and its
//! partial copy is removed. Files are created `0600` and directories `0700`
//! on Unix. Work is sequential and not rolled back on failure.

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::constants::{HTTP_FETCH_TIMEOUT, MANIFEST_FILE_NAME};
use crate::core::BreadcrumbsError;
use crate::manifest::{FileReference, FileSource, Manifest};
use crate::utils::fs::BoundedCopyError;
use crate::utils::{SizeLimiter, copy_bounded, create_private_dir, create_private_file};

/// Materializes `manifest` under `root`.
///
/// # Examples
///
/// ```rust,no_run
/// use breadcrumbs_cli::config::PluginConfig;
/// use breadcrumbs_cli::git::GitRevision;
/// use breadcrumbs_cli::manifest::{Manifest, OptionalManifestFields};
/// use breadcrumbs_cli::materializer::materialize;
/// use std::path::Path;
///
/// # async fn example(config: PluginConfig) -> anyhow::Result<()> {
/// let manifest = Manifest::build(&config, &GitRevision, OptionalManifestFields::default()).await?;
/// materialize(Path::new("/tmp/crumbs"), &manifest, config.save_file_size_bytes).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// - [`BreadcrumbsError::FileTooLarge`] if a source exceeds `max_file_size_bytes`
/// - [`BreadcrumbsError::FetchFailed`] if a server answers anything but 200
/// - [`BreadcrumbsError::NetworkError`] if a request cannot be completed
/// - [`BreadcrumbsError::UnknownFileSource`] for a reference that was never resolved
/// - I/O errors creating directories or files
pub async fn materialize(root: &Path, manifest: &Manifest, max_file_size_bytes: u64) -> Result<()> {
    create_private_dir(root).await?;

    write_private_file(&root.join(MANIFEST_FILE_NAME), manifest.to_json()?.as_bytes()).await?;
    write_private_file(&root.join(&manifest.packer_template_path), manifest.template_raw()).await?;

    let client = Client::builder()
        .timeout(HTTP_FETCH_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;

    for reference in &manifest.found_files {
        let remote = match reference.source {
            FileSource::LocalStorage => false,
            FileSource::HttpHost | FileSource::HttpsHost => true,
            FileSource::Unknown => {
                return Err(BreadcrumbsError::UnknownFileSource {
                    source_name: reference.source.to_string(),
                    path: reference.found_at_path.clone(),
                }
                .into());
            }
        };

        create_private_dir(&reference.destination_dir(root)).await?;
        let destination = reference.destination_path(root);

        if remote {
            fetch_http_file(&client, &reference.found_at_path, &destination, max_file_size_bytes)
                .await?;
        } else {
            copy_local_file(manifest, reference, &destination, max_file_size_bytes).await?;
        }

        tracing::debug!(
            target: "materialize",
            "Stored '{}' as {}",
            reference.found_at_path,
            reference.stored_at_path
        );
    }

    tracing::info!(
        target: "materialize",
        "Created {} breadcrumb(s) at '{}'",
        manifest.found_files.len(),
        root.display()
    );
    Ok(())
}

async fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = create_private_file(path).await?;
    file.write_all(contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.flush().await?;
    Ok(())
}

async fn copy_local_file(
    manifest: &Manifest,
    reference: &FileReference,
    destination: &Path,
    max_file_size_bytes: u64,
) -> Result<()> {
    let source_path = manifest.local_source_path(reference);
    let mut source = tokio::fs::File::open(&source_path).await.with_context(|| {
        format!(
            "Failed to copy local file '{}' to '{}'",
            reference.found_at_path,
            destination.display()
        )
    })?;

    let mut dest = create_private_file(destination).await?;
    let mut limiter = SizeLimiter::new(max_file_size_bytes);
    let result = copy_bounded(&mut source, &mut dest, &mut limiter).await;
    drop(dest);

    match result {
        Ok(_) => Ok(()),
        Err(err) => {
            discard_partial(destination).await;
            match err {
                BoundedCopyError::LimitExceeded(exceeded) => Err(BreadcrumbsError::FileTooLarge {
                    source_path: reference.found_at_path.clone(),
                    limit: exceeded.limit,
                }
                .into()),
                BoundedCopyError::Io(e) => Err(anyhow::Error::from(e).context(format!(
                    "Failed to copy local file '{}' to '{}'",
                    reference.found_at_path,
                    destination.display()
                ))),
            }
        }
    }
}

async fn fetch_http_file(
    client: &Client,
    url: &str,
    destination: &Path,
    max_file_size_bytes: u64,
) -> Result<()> {
    let network_error = |e: reqwest::Error| BreadcrumbsError::NetworkError {
        url: url.to_string(),
        reason: e.to_string(),
    };

    tracing::debug!(target: "materialize", "Fetching '{}'", url);
    let response = client.get(url).send().await.map_err(network_error)?;

    if response.status() != StatusCode::OK {
        return Err(BreadcrumbsError::FetchFailed {
            url: url.to_string(),
            status: response.status().as_u16(),
        }
        .into());
    }

    let mut limiter = SizeLimiter::new(max_file_size_bytes);
    if let Some(length) = response.content_length() {
        if let Err(exceeded) = limiter.check(length) {
            return Err(BreadcrumbsError::FileTooLarge {
                source_path: url.to_string(),
                limit: exceeded.limit,
            }
            .into());
        }
    }

    let mut dest = create_private_file(destination).await?;
    let result = stream_body(response, &mut dest, &mut limiter, url).await;
    drop(dest);

    if result.is_err() {
        discard_partial(destination).await;
    }
    result
}

async fn stream_body(
    mut response: Response,
    dest: &mut tokio::fs::File,
    limiter: &mut SizeLimiter,
    url: &str,
) -> Result<()> {
    while let Some(chunk) = response.chunk().await.map_err(|e| BreadcrumbsError::NetworkError {
        url: url.to_string(),
        reason: e.to_string(),
    })? {
        limiter.admit(chunk.len()).map_err(|exceeded| BreadcrumbsError::FileTooLarge {
            source_path: url.to_string(),
            limit: exceeded.limit,
        })?;
        dest.write_all(&chunk).await?;
    }

    dest.flush().await?;
    Ok(())
}

async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(target: "materialize", "Failed to remove partial file {}: {}", path.display(), e);
    }
}
