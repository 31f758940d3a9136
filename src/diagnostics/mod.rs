use serde::Serialize;
use thiserror::Error;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Malformed literal, comment or character.
    Lex,
    /// Token-level grammar violation.
    Syntax,
    /// Well-formed tokens in an impossible arrangement (alias with a body, model without `needs`, ...).
    Structural,
    /// A grammar choice the parser could not resolve. Only raised by internal consistency checks.
    Ambiguity,
    /// Input ended inside a token and the parse stopped.
    EndOfInput,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Lex => "lex",
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::Structural => "structural",
            DiagnosticKind::Ambiguity => "ambiguity",
            DiagnosticKind::EndOfInput => "end of input",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind} error: {message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    /// Tokens that would have been accepted at `span`, when known.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expected: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self { kind, message: message.into(), span, expected: Vec::new() }
    }

    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Lex, message, span)
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Syntax, message, span)
    }

    pub fn structural(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Structural, message, span)
    }

    pub fn ambiguity(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Ambiguity, message, span)
    }

    pub fn with_expected<I, S>(mut self, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.expected = expected.into_iter().map(|s| s.to_string()).collect();
        self
    }
}

/// The error half of the parser's internal `Result`. Recorded at the nearest recovery point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(transparent)]
pub struct ParseError(pub Box<Diagnostic>);

impl ParseError {
    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        *self.0
    }
}

impl From<Diagnostic> for ParseError {
    fn from(d: Diagnostic) -> Self {
        ParseError(Box::new(d))
    }
}

/// Render diagnostics with ariadne for terminal output.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    use ariadne::{Label, Report, ReportKind, Source};

    for diag in diagnostics {
        let message = if diag.expected.is_empty() {
            diag.message.clone()
        } else {
            format!("{} (expected {})", diag.message, diag.expected.join(", "))
        };
        let label = Label::new((filename, diag.span.start..diag.span.end)).with_message(message);
        let report = Report::build(ReportKind::Error, filename, diag.span.start)
            .with_message(format!("{} error", diag.kind))
            .with_label(label)
            .finish();
        if let Err(e) = report.eprint((filename, Source::from(source))) {
            eprintln!("error: {diag} ({e})");
        }
    }
}
