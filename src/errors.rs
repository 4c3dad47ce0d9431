//! Verdict engine diagnostics.
//!
//! Errors in this module are *caller* errors: malformed identifier text, an
//! invalid identifier format, or a structurally invalid suite registration.
//! They are never produced by test code: failures raised while executing
//! lifecycle members and test members are carried as [`crate::failure::Failure`]
//! values and reported through the run listener instead.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use thiserror::Error;

/// Shared source text for diagnostics.
pub type SourceArc = Arc<NamedSource<String>>;

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The primary source for this error (if any).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<SourceSpan>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a context with both source and span.
    pub fn with_source_and_span(source: SourceArc, span: SourceSpan) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }

    /// Creates a context with source, span, and help message.
    pub fn with_all(source: SourceArc, span: SourceSpan, help: impl Into<String>) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: Some(help.into()),
        }
    }
}

/// Unified error type for all engine-level failure modes.
#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("Malformed identifier: {message}")]
    MalformedIdentifier { message: String, ctx: ErrorContext },

    #[error("Invalid identifier format: {message}")]
    InvalidFormat { message: String, ctx: ErrorContext },

    #[error("Suite construction error: {message}")]
    SuiteConstruction { message: String, ctx: ErrorContext },
}

impl VerdictError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            VerdictError::MalformedIdentifier { ctx, .. } => ctx,
            VerdictError::InvalidFormat { ctx, .. } => ctx,
            VerdictError::SuiteConstruction { ctx, .. } => ctx,
        }
    }

    fn primary_label(&self) -> String {
        match self {
            VerdictError::MalformedIdentifier { .. } => "not a well-formed segment".into(),
            VerdictError::InvalidFormat { .. } => "invalid format".into(),
            VerdictError::SuiteConstruction { .. } => "registered here".into(),
        }
    }

    const fn code_str(&self) -> &'static str {
        match self {
            VerdictError::MalformedIdentifier { .. } => "verdict::identifier::malformed",
            VerdictError::InvalidFormat { .. } => "verdict::identifier::invalid_format",
            VerdictError::SuiteConstruction { .. } => "verdict::suite::construction",
        }
    }
}

impl Diagnostic for VerdictError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.get_ctx().span?;
        let labels = vec![LabeledSpan::new_with_span(Some(self.primary_label()), span)];
        Some(Box::new(labels.into_iter()))
    }
}

// ============================================================================
// CONSTRUCTION HELPERS
// ============================================================================
//
// All error construction outside this module goes through these helpers, so
// `VerdictError` values are never assembled field-by-field at call sites.

/// Constructs a malformed-identifier error with a labeled span into the
/// offending identifier text.
pub fn malformed_identifier(
    message: impl Into<String>,
    text: &str,
    span: impl Into<SourceSpan>,
) -> VerdictError {
    let source = Arc::new(NamedSource::new("identifier", text.to_string()));
    VerdictError::MalformedIdentifier {
        message: message.into(),
        ctx: ErrorContext::with_all(
            source,
            span.into(),
            "identifier text must be one or more `[kind:value]` segments, starting with an `engine` segment",
        ),
    }
}

/// Constructs an invalid-format error (bad delimiter or separator).
pub fn invalid_format(message: impl Into<String>) -> VerdictError {
    VerdictError::InvalidFormat {
        message: message.into(),
        ctx: ErrorContext::none(),
    }
}

/// Constructs a suite-construction error (invalid registration).
pub fn suite_construction(message: impl Into<String>) -> VerdictError {
    VerdictError::SuiteConstruction {
        message: message.into(),
        ctx: ErrorContext::none(),
    }
}

/// Prints a `VerdictError` with full miette diagnostics.
///
/// Use this for user-facing error display when building suites or parsing
/// identifiers from the command line.
pub fn print_error(error: VerdictError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
