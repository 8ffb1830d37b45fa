//! Suffix-driven reference scanner.
//!
//! The scanner looks for file paths and URLs inside a template without parsing
//! it. Each candidate is found by a fixed sequence of rules:
//!
//! 1. **Next occurrence** - find the suffix at or after the cursor.
//! 2. **Delimiter sniffing** - the byte right after the suffix picks the
//!    delimiter if it is one of `'`, `"` or space; otherwise `"` is assumed.
//! 3. **Opening delimiter** - the nearest preceding delimiter (not before the
//!    cursor) opens the match, which runs through the end of the suffix.
//! 4. **Bare suffix** - a match consisting of the suffix alone is dropped.
//! 5. **Variable widening** - if the span from the opening delimiter contains
//!    a `}}` marker, the start moves back to the line boundary and then forward
//!    to the first `{{` on that line, so a quote inside the variable expression
//!    does not cut it short.
//! 6. **Advance** - scanning resumes right after the suffix.
//!
//! A suffix that is not followed by a delimiter falls back to `"` and may
//! produce a match reaching back to an unrelated quote earlier on the line.
//! This is a known limitation of the heuristic.

use super::{TemplateSyntax, find_bytes};

/// One candidate reference found by [`ReferenceScanner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHit {
    /// The matched text, lossily decoded as UTF-8
    pub text: String,
    /// Byte offset of the first matched byte in the template
    pub start: usize,
    /// Byte offset just past the suffix
    pub end: usize,
    /// Whether the text still contains variable syntax
    pub unresolved: bool,
}

/// Iterator over every reference ending in `suffix`, left to right.
///
/// Hits never overlap and are yielded in source order.
///
/// # Examples
///
/// ```rust
/// use breadcrumbs_cli::template::{ReferenceScanner, TemplateSyntax};
///
/// let raw = br#"{ "kickstart": "https://x.com/a.ks", "abc": "b.ks" }"#;
/// let syntax = TemplateSyntax::default();
/// let hits: Vec<String> =
///     ReferenceScanner::new(raw, ".ks", &syntax).map(|hit| hit.text).collect();
/// assert_eq!(hits, ["https://x.com/a.ks", "b.ks"]);
/// ```
#[derive(Debug, Clone)]
pub struct ReferenceScanner<'a> {
    raw: &'a [u8],
    suffix: &'a [u8],
    syntax: &'a TemplateSyntax,
    cursor: usize,
}

impl<'a> ReferenceScanner<'a> {
    /// Creates a scanner over `raw` for references ending in `suffix`.
    ///
    /// An empty suffix yields no hits.
    #[must_use]
    pub fn new(raw: &'a [u8], suffix: &'a str, syntax: &'a TemplateSyntax) -> Self {
        Self {
            raw,
            suffix: suffix.as_bytes(),
            syntax,
            cursor: 0,
        }
    }

    /// Offset the next search starts from.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Examines the next suffix occurrence.
    ///
    /// Returns `None` when no occurrence is left, otherwise the match range
    /// (relative to the window) if one survived the rules, plus the window
    /// offset to resume from.
    fn next_candidate(&self) -> Option<(Option<(usize, usize)>, usize)> {
        let window = &self.raw[self.cursor..];
        let suffix_start = find_bytes(window, self.suffix)?;
        let end = suffix_start + self.suffix.len();

        let delimiter = sniff_delimiter(self.syntax, window, end);
        let Some(opening) = window[..suffix_start].iter().rposition(|&b| b == delimiter) else {
            tracing::trace!(
                target: "scanner",
                "No opening delimiter before suffix at offset {}",
                self.cursor + suffix_start
            );
            return Some((None, end));
        };

        let start = widen_to_variable(self.syntax, window, opening, end).unwrap_or(opening + 1);

        if end - start <= self.suffix.len() {
            return Some((None, end));
        }

        Some((Some((start, end)), end))
    }
}

impl Iterator for ReferenceScanner<'_> {
    type Item = ScanHit;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.raw.len() {
            let (matched, advance) = self.next_candidate()?;
            let base = self.cursor;
            self.cursor += advance;

            if let Some((start, end)) = matched {
                let text = String::from_utf8_lossy(&self.raw[base + start..base + end]).into_owned();
                let unresolved = self.syntax.is_unresolved(&text);
                tracing::debug!(target: "scanner", "Found reference '{}' (unresolved: {})", text, unresolved);
                return Some(ScanHit {
                    text,
                    start: base + start,
                    end: base + end,
                    unresolved,
                });
            }
        }

        None
    }
}

/// Delimiter sniffing: the byte right after the suffix hints at the quoting style.
fn sniff_delimiter(syntax: &TemplateSyntax, window: &[u8], end: usize) -> u8 {
    match window.get(end) {
        Some(next) if syntax.delimiters.contains(next) => *next,
        _ => syntax.default_delimiter,
    }
}

/// Variable widening: start of the whole variable expression, if the match contains one.
fn widen_to_variable(
    syntax: &TemplateSyntax,
    window: &[u8],
    opening: usize,
    end: usize,
) -> Option<usize> {
    find_bytes(&window[opening..end], syntax.close_marker.as_bytes())?;

    let line_start = window[..end].iter().rposition(|&b| b == syntax.line_break).unwrap_or(0);
    let open = find_bytes(&window[line_start..end], syntax.open_marker.as_bytes())?;
    Some(line_start + open)
}
