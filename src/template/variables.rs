//! Template variable expansion.
//!
//! Two kinds of variable are understood:
//!
//! - **User variables**: `{{ user `name` }}`, the name sits between back-ticks
//! - **Special variables**: `{{ .Name }}`, the name follows the dot
//!
//! Expansion is single-pass over the original input. Every span whose name is
//! known is replaced everywhere it occurs; substituted values are never
//! expanded again. The first unknown name stops resolution with
//! [`ResolveError::MissingVariable`], which callers may recover from with a disk
//! search. A span that is neither kind is fatal.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use super::{TemplateSyntax, find_bytes};
use crate::core::BreadcrumbsError;

/// Why a reference could not be fully expanded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The span is neither a user nor a special variable
    #[error("Unknown template variable type in '{raw}'")]
    UnknownVariableType {
        /// The offending span, markers included
        raw: String,
    },

    /// The variable is well formed but has no known value
    #[error("Template variable '{name}' does not exist in the provided variables")]
    MissingVariable {
        /// Name of the variable
        name: String,
    },
}

impl From<ResolveError> for BreadcrumbsError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnknownVariableType { raw } => Self::UnknownVariableType { raw },
            ResolveError::MissingVariable { name } => Self::MissingVariable { name },
        }
    }
}

/// Kind of a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// `{{ user `name` }}`
    User,
    /// `{{ .Name }}`
    Special,
}

/// A classified variable span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariable {
    /// The span exactly as written, markers included
    pub raw: String,
    /// User or special
    pub kind: VariableKind,
    /// Name looked up in the known variables
    pub name: String,
}

impl TemplateVariable {
    /// Classifies a raw `{{ ... }}` span.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownVariableType`] for an empty body, a body
    /// with neither the user keyword nor the special prefix, or a user variable
    /// without a quoted name.
    pub fn parse(raw: &str, syntax: &TemplateSyntax) -> Result<Self, ResolveError> {
        let unknown = || ResolveError::UnknownVariableType {
            raw: raw.to_string(),
        };

        let body = raw
            .strip_prefix(syntax.open_marker)
            .and_then(|rest| rest.strip_suffix(syntax.close_marker))
            .map(str::trim)
            .ok_or_else(unknown)?;

        if body.starts_with(syntax.user_keyword) {
            let open = body.find(syntax.user_name_quote).ok_or_else(unknown)?;
            let close = body.rfind(syntax.user_name_quote).ok_or_else(unknown)?;
            if close <= open {
                return Err(unknown());
            }
            let name = &body[open + syntax.user_name_quote.len_utf8()..close];
            return Ok(Self {
                raw: raw.to_string(),
                kind: VariableKind::User,
                name: name.to_string(),
            });
        }

        if let Some(name) = body.strip_prefix(syntax.special_prefix) {
            return Ok(Self {
                raw: raw.to_string(),
                kind: VariableKind::Special,
                name: name.to_string(),
            });
        }

        Err(unknown())
    }
}

/// Finds the next variable span in `input`, returned as a byte range.
///
/// # Errors
///
/// Returns [`ResolveError::UnknownVariableType`] if an open marker is never closed.
pub fn next_variable(
    input: &str,
    syntax: &TemplateSyntax,
) -> Result<Option<(usize, usize)>, ResolveError> {
    let Some(start) = find_bytes(input.as_bytes(), syntax.open_marker.as_bytes()) else {
        return Ok(None);
    };

    let body_start = start + syntax.open_marker.len();
    let close = find_bytes(&input.as_bytes()[body_start..], syntax.close_marker.as_bytes())
        .ok_or_else(|| ResolveError::UnknownVariableType {
            raw: input[start..].to_string(),
        })?;

    Ok(Some((start, body_start + close + syntax.close_marker.len())))
}

/// Expands every variable in `input` using `known`.
///
/// # Examples
///
/// ```rust
/// use breadcrumbs_cli::template::{TemplateSyntax, resolve_variables};
/// use std::collections::BTreeMap;
///
/// let known = BTreeMap::from([("abc".to_string(), "hello".to_string())]);
/// let resolved =
///     resolve_variables("{{ user `abc` }}/ks.ks", &known, &TemplateSyntax::default()).unwrap();
/// assert_eq!(resolved, "hello/ks.ks");
/// ```
///
/// # Errors
///
/// - [`ResolveError::UnknownVariableType`] for a span of unknown kind (fatal)
/// - [`ResolveError::MissingVariable`] for the first name absent from `known`
pub fn resolve_variables(
    input: &str,
    known: &BTreeMap<String, String>,
    syntax: &TemplateSyntax,
) -> Result<String, ResolveError> {
    let mut resolved = input.to_string();
    let mut cursor = 0;

    while let Some((start, end)) = next_variable(&input[cursor..], syntax)? {
        let raw = &input[cursor + start..cursor + end];
        cursor += end;

        let variable = TemplateVariable::parse(raw, syntax)?;
        let Some(value) = known.get(&variable.name) else {
            tracing::debug!(
                target: "resolver",
                "No value for {:?} variable '{}'",
                variable.kind,
                variable.name
            );
            return Err(ResolveError::MissingVariable {
                name: variable.name,
            });
        };

        resolved = resolved.replace(raw, value);
    }

    Ok(resolved)
}

/// Splits what follows the last variable span into a directory hint and a file name.
///
/// Only normal and `..` components survive in the hint, so `{{ .X }}/ks.ks`
/// yields an empty hint. Returns `None` when `input` holds no close marker or
/// nothing file-like follows it.
///
/// # Examples
///
/// ```rust
/// use breadcrumbs_cli::template::{TemplateSyntax, split_after_last_variable};
/// use std::path::PathBuf;
///
/// let syntax = TemplateSyntax::default();
/// let (hint, name) = split_after_last_variable("{{ user `a` }}/http/ks.ks", &syntax).unwrap();
/// assert_eq!(hint, PathBuf::from("http"));
/// assert_eq!(name, "ks.ks");
/// ```
#[must_use]
pub fn split_after_last_variable(input: &str, syntax: &TemplateSyntax) -> Option<(PathBuf, String)> {
    let last_close = input.rfind(syntax.close_marker)?;
    let tail = Path::new(&input[last_close + syntax.close_marker.len()..]);

    let name = tail.file_name()?.to_str()?.to_string();
    let hint = tail
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter(|component| matches!(component, Component::Normal(_) | Component::ParentDir))
                .collect::<PathBuf>()
        })
        .unwrap_or_default();

    Some((hint, name))
}
