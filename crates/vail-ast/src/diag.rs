//! Build diagnostics.
//!
//! A `Diagnostic` is one user-visible message tied to an optional source
//! location. Diagnostics render as `path:line:col: message` (1-based line
//! and column); a diagnostic without a span renders as `path: message`.
//! Messages from independent files are aggregated by the driver rather
//! than failing fast.

use crate::foundation::{SourceMap, Span};
use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Warning; compilation of the unit continues
    Warning,
    /// Error; blocks code generation for the unit
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One user-visible message tied to a source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source location, if one is known (synthesized nodes have none)
    pub span: Option<Span>,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create an error diagnostic with a location.
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            span: Some(span),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Create an error diagnostic with no location.
    pub fn error_nospan(message: impl Into<String>) -> Self {
        Self {
            span: None,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic with a location.
    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self {
            span: Some(span),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Render as `path:line:col: message` using the source map.
    pub fn render(&self, sources: &SourceMap) -> String {
        match &self.span {
            Some(span) => {
                let (line, col) = sources.line_col(span);
                format!(
                    "{}:{}:{}: {}",
                    sources.file_path(span).display(),
                    line,
                    col,
                    self.message
                )
            }
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn renders_one_based_location() {
        let mut sources = SourceMap::new();
        let id = sources.add_file(PathBuf::from("a.vail"), "let x = y\n".to_string());
        let diag = Diagnostic::error(Span::new(id, 8, 9, 1), "undefined variable: y");
        assert_eq!(diag.render(&sources), "a.vail:1:9: undefined variable: y");
    }

    #[test]
    fn renders_without_span() {
        let sources = SourceMap::new();
        let diag = Diagnostic::error_nospan("no input files");
        assert_eq!(diag.render(&sources), "no input files");
    }
}
