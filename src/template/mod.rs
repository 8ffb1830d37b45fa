//! Lexical analysis of build templates.
//!
//! Templates are scanned as raw bytes, never parsed. Two passes run over each
//! reference:
//!
//! - [`scanner`] finds delimited substrings ending in an include suffix
//! - [`variables`] expands `{{ user `name` }}` and `{{ .Name }}` spans inside them
//!
//! Both passes read their delimiters and markers from a [`TemplateSyntax`] value
//! instead of module-level tables.

pub mod scanner;
pub mod variables;

pub use scanner::{ReferenceScanner, ScanHit};
pub use variables::{
    ResolveError, TemplateVariable, VariableKind, next_variable, resolve_variables,
    split_after_last_variable,
};

/// Delimiters and markers the scanner and resolver look for.
///
/// [`TemplateSyntax::PACKER`] (also the [`Default`]) describes Packer JSON templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSyntax {
    /// Delimiter assumed when the byte after a suffix is not a recognized delimiter
    pub default_delimiter: u8,
    /// Bytes that may enclose a reference
    pub delimiters: &'static [u8],
    /// Opening marker of a variable span
    pub open_marker: &'static str,
    /// Closing marker of a variable span
    pub close_marker: &'static str,
    /// Characters whose presence marks a reference as unresolved
    pub variable_chars: &'static [char],
    /// Line boundary used when widening a match to a whole variable expression
    pub line_break: u8,
    /// Keyword introducing a user variable
    pub user_keyword: &'static str,
    /// Quote enclosing a user variable name
    pub user_name_quote: char,
    /// Prefix of a special variable
    pub special_prefix: char,
}

impl TemplateSyntax {
    /// Packer JSON template syntax.
    pub const PACKER: Self = Self {
        default_delimiter: b'"',
        delimiters: b"'\" ",
        open_marker: "{{",
        close_marker: "}}",
        variable_chars: &['{', '}'],
        line_break: b'\n',
        user_keyword: "user",
        user_name_quote: '`',
        special_prefix: '.',
    };

    /// Whether `text` still contains variable syntax.
    #[must_use]
    pub fn is_unresolved(&self, text: &str) -> bool {
        text.contains(self.variable_chars)
    }
}

impl Default for TemplateSyntax {
    fn default() -> Self {
        Self::PACKER
    }
}

/// Finds the first occurrence of `needle` in `haystack`.
pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
