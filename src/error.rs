//! Link Grammar error handling.
//!
//! Every failure a caller can observe is a [`LinkGrammarError`]. The variants map
//! one-to-one onto the error kinds of the session API; [`ErrorType`] gives a
//! `Copy` classification so callers can match on the kind without destructuring.

use std::{fmt, path::PathBuf, sync::Arc};

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use thiserror::Error;

use crate::session::SessionState;

/// Shared, named source text attached to dictionary diagnostics.
pub type SourceArc = Arc<NamedSource<String>>;

/// Crate-wide result alias.
pub type Result<T, E = LinkGrammarError> = std::result::Result<T, E>;

// ============================================================================
// ERROR CLASSIFICATION
// ============================================================================

/// Type-safe error classification that corresponds to the `LinkGrammarError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Bad search root or bad option value
    Configuration,
    /// Unresolvable or malformed dictionary for a language code
    DictionaryNotFound,
    /// Engine-level parse fault
    Parse,
    /// Negative linkage index
    RangeUnderflow,
    /// Linkage index at or past the current number of linkages
    RangeOutOfBounds,
    /// Operation invalid for the current session state
    State,
    /// Operation on a released session
    SessionClosed,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Configuration => "ConfigurationError",
            ErrorType::DictionaryNotFound => "DictionaryNotFoundError",
            ErrorType::Parse => "ParseError",
            ErrorType::RangeUnderflow => "RangeUnderflowError",
            ErrorType::RangeOutOfBounds => "RangeOutOfBoundsError",
            ErrorType::State => "StateError",
            ErrorType::SessionClosed => "SessionClosedError",
        }
    }

    fn code_suffix(&self) -> &'static str {
        match self {
            ErrorType::Configuration => "configuration",
            ErrorType::DictionaryNotFound => "dictionary",
            ErrorType::Parse => "parse",
            ErrorType::RangeUnderflow => "range_underflow",
            ErrorType::RangeOutOfBounds => "range_out_of_bounds",
            ErrorType::State => "state",
            ErrorType::SessionClosed => "session_closed",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SOURCE CONTEXT - Where in a dictionary file a problem was found
// ============================================================================

/// Location of a dictionary problem, used to render a labelled snippet.
#[derive(Debug, Clone)]
pub struct DictionarySource {
    pub source: SourceArc,
    pub span: SourceSpan,
    pub label: String,
}

impl DictionarySource {
    pub fn new(
        name: impl AsRef<str>,
        text: &str,
        span: SourceSpan,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source: Arc::new(NamedSource::new(name, text.to_string())),
            span,
            label: label.into(),
        }
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Unified error type for every failure mode of the catalog, sessions and renderers.
#[derive(Debug, Error)]
pub enum LinkGrammarError {
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        help: Option<String>,
    },
    #[error("Dictionary not found for language '{language}': {reason}")]
    DictionaryNotFound {
        language: String,
        search_root: PathBuf,
        reason: String,
        location: Option<DictionarySource>,
    },
    #[error("Parse error: {message}")]
    Parse { message: String },
    #[error("Linkage index {index} is negative")]
    RangeUnderflow { index: i64 },
    #[error("Linkage index {index} is out of bounds ({num_linkages} linkages available)")]
    RangeOutOfBounds { index: i64, num_linkages: usize },
    #[error("Operation '{operation}' is not valid in state {state}")]
    State {
        operation: &'static str,
        state: SessionState,
    },
    #[error("Operation '{operation}' called on a released session")]
    SessionClosed { operation: &'static str },
}

impl LinkGrammarError {
    /// Returns the type-safe classification of this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            LinkGrammarError::Configuration { .. } => ErrorType::Configuration,
            LinkGrammarError::DictionaryNotFound { .. } => ErrorType::DictionaryNotFound,
            LinkGrammarError::Parse { .. } => ErrorType::Parse,
            LinkGrammarError::RangeUnderflow { .. } => ErrorType::RangeUnderflow,
            LinkGrammarError::RangeOutOfBounds { .. } => ErrorType::RangeOutOfBounds,
            LinkGrammarError::State { .. } => ErrorType::State,
            LinkGrammarError::SessionClosed { .. } => ErrorType::SessionClosed,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        LinkGrammarError::Configuration {
            message: message.into(),
            help: None,
        }
    }

    pub(crate) fn configuration_with_help(
        message: impl Into<String>,
        help: impl Into<String>,
    ) -> Self {
        LinkGrammarError::Configuration {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        LinkGrammarError::Parse {
            message: message.into(),
        }
    }

    pub(crate) fn dictionary(
        language: impl Into<String>,
        search_root: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        LinkGrammarError::DictionaryNotFound {
            language: language.into(),
            search_root: search_root.into(),
            reason: reason.into(),
            location: None,
        }
    }

    /// Attach a dictionary source location to a `DictionaryNotFound` error.
    pub(crate) fn with_location(mut self, loc: DictionarySource) -> Self {
        if let LinkGrammarError::DictionaryNotFound { location, .. } = &mut self {
            *location = Some(loc);
        }
        self
    }
}

impl Diagnostic for LinkGrammarError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!(
            "link_grammar::{}",
            self.error_type().code_suffix()
        )))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help: Option<String> = match self {
            LinkGrammarError::Configuration { help, .. } => help.clone(),
            LinkGrammarError::DictionaryNotFound { search_root, .. } => Some(format!(
                "dictionaries are looked up as <root>/<language>/4.0.dict under {}",
                search_root.display()
            )),
            LinkGrammarError::RangeUnderflow { .. } => {
                Some("linkage indices start at 0".to_string())
            }
            LinkGrammarError::RangeOutOfBounds { num_linkages: 0, .. } => {
                Some("the last parse produced no linkages".to_string())
            }
            LinkGrammarError::RangeOutOfBounds { num_linkages, .. } => {
                Some(format!("valid indices are 0..{}", num_linkages))
            }
            LinkGrammarError::State { .. } => {
                Some("parse a sentence and select a linkage first".to_string())
            }
            LinkGrammarError::SessionClosed { .. } => {
                Some("create a new session; released sessions cannot be reused".to_string())
            }
            LinkGrammarError::Parse { .. } => None,
        };
        help.map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            LinkGrammarError::DictionaryNotFound {
                location: Some(loc),
                ..
            } => Some(loc.source.as_ref() as &dyn SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            LinkGrammarError::DictionaryNotFound {
                location: Some(loc),
                ..
            } => Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
                Some(loc.label.clone()),
                loc.span,
            )))),
            _ => None,
        }
    }
}
