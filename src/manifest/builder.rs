//! Manifest assembly.
//!
//! [`Manifest::build`] reads the template, scans it once per include suffix,
//! resolves every reference that still contains variable syntax and folds the
//! results into a [`Manifest`]. Resolution follows this order:
//!
//! 1. Expand the variables from the configured user variables
//! 2. On a missing variable, search the project tree for the file by name,
//!    scoped by whatever directory follows the last variable span
//! 3. Give up with [`BreadcrumbsError::FileNotFound`] if nothing matches
//!
//! Unknown variable kinds are fatal at any point.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use super::{FileReference, Manifest, OptionalManifestFields};
use crate::config::PluginConfig;
use crate::core::BreadcrumbsError;
use crate::git::RevisionProvider;
use crate::template::{
    ReferenceScanner, ResolveError, TemplateSyntax, resolve_variables, split_after_last_variable,
};
use crate::utils::{find_file_by_name, hash_bytes};

impl Manifest {
    /// Builds the manifest for a validated configuration.
    ///
    /// `optional` carries the probed OS fields; pass the default when no live
    /// target is available.
    ///
    /// # Errors
    ///
    /// - [`BreadcrumbsError::TemplateTooLarge`] if the template exceeds `template_size_bytes`
    /// - [`BreadcrumbsError::UnknownVariableType`] for an unsupported variable span
    /// - [`BreadcrumbsError::FileNotFound`] if the disk fallback finds nothing
    /// - the revision provider's error if the revision cannot be determined
    /// - I/O errors reading the template
    pub async fn build<R>(
        config: &PluginConfig,
        revision: &R,
        optional: OptionalManifestFields,
    ) -> Result<Self>
    where
        R: RevisionProvider + ?Sized,
    {
        let template_path = config.template_path.as_path();
        let project_dir = config.project_dir();

        let metadata = tokio::fs::metadata(template_path).await.with_context(|| {
            format!("Failed to read template metadata: {}", template_path.display())
        })?;
        if metadata.len() > config.template_size_bytes {
            return Err(BreadcrumbsError::TemplateTooLarge {
                path: template_path.display().to_string(),
                limit: config.template_size_bytes,
            }
            .into());
        }

        let template_raw = tokio::fs::read(template_path)
            .await
            .with_context(|| format!("Failed to read template: {}", template_path.display()))?;

        let found_files = discover_references(
            &template_raw,
            &config.include_suffixes,
            &config.packer_user_variables,
            project_dir,
            &TemplateSyntax::default(),
        )?;
        tracing::info!(
            "Found {} breadcrumb(s) in '{}'",
            found_files.len(),
            template_path.display()
        );

        let git_revision = revision.current_revision(project_dir).await?;

        let template_name = template_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            plugin_version: config.plugin_version.clone(),
            git_revision,
            packer_build_name: config.packer_build_name.clone(),
            packer_build_type: config.packer_builder_type.clone(),
            packer_user_variables: config.packer_user_variables.clone(),
            os_name: optional.os_name,
            os_version: optional.os_version,
            include_suffixes: config.include_suffixes.clone(),
            packer_template_path: hash_bytes(template_name.as_bytes()),
            found_files,
            template_raw,
            project_dir: project_dir.to_path_buf(),
        })
    }
}

/// Scans `raw` for every suffix in order and resolves each hit.
///
/// The result is ordered by suffix, then by position in the template.
///
/// # Errors
///
/// See [`Manifest::build`].
pub fn discover_references(
    raw: &[u8],
    suffixes: &[String],
    variables: &BTreeMap<String, String>,
    project_dir: &Path,
    syntax: &TemplateSyntax,
) -> Result<Vec<FileReference>, BreadcrumbsError> {
    let mut references = Vec::new();

    for suffix in suffixes {
        let before = references.len();
        for hit in ReferenceScanner::new(raw, suffix, syntax) {
            let reference = if hit.unresolved {
                resolve_reference(&FileReference::unresolved(hit.text), variables, project_dir, syntax)?
            } else {
                FileReference::new(hit.text)
            };
            references.push(reference);
        }
        tracing::debug!(
            target: "scanner",
            "Suffix '{}' matched {} reference(s)",
            suffix,
            references.len() - before
        );
    }

    Ok(references)
}

fn resolve_reference(
    unresolved: &FileReference,
    variables: &BTreeMap<String, String>,
    project_dir: &Path,
    syntax: &TemplateSyntax,
) -> Result<FileReference, BreadcrumbsError> {
    let raw = unresolved.found_at_path.as_str();

    match resolve_variables(raw, variables, syntax) {
        Ok(resolved) => {
            tracing::debug!(target: "resolver", "Resolved '{}' to '{}'", raw, resolved);
            Ok(FileReference::new(resolved))
        }
        Err(ResolveError::MissingVariable { name }) => {
            let Some((hint, file_name)) = split_after_last_variable(raw, syntax) else {
                return Err(BreadcrumbsError::MissingVariable { name });
            };

            let search_dir = project_dir.join(&hint);
            tracing::debug!(
                target: "resolver",
                "Variable '{}' is unknown, searching '{}' for '{}'",
                name,
                search_dir.display(),
                file_name
            );

            let located = hint.join(find_file_by_name(&file_name, &search_dir)?);
            Ok(FileReference::new(located.to_string_lossy().into_owned()))
        }
        Err(err) => Err(err.into()),
    }
}
