//! Error types for restriction, ordering and pagination values.
//!
//! Every failure in this crate is a [`QueryError`] carrying an [`ErrorCode`]
//! for programmatic handling, a message, and optional context and suggestions.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: S{category}{number}
//! - 1xxx: Argument errors (missing value, empty cursor, non-positive size)
//! - 2xxx: Navigation errors (no next/previous page, wrong pagination mode)
//! - 3xxx: Capability errors (the backing store cannot honor the request)
//! - 4xxx: State-access errors (totals read without being requested)
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use sift_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::argument_required("value");
//! assert_eq!(err.code, ErrorCode::ArgumentRequired);
//! assert!(err.is_argument_error());
//! assert!(err.to_string().starts_with("[S1001]"));
//! ```
//!
//! # Capability Errors
//!
//! Collaborators report operators, sorts or pagination modes they cannot
//! execute with [`QueryError::unsupported`]. Callers can detect these and
//! fall back:
//!
//! ```rust
//! use sift_query::QueryError;
//!
//! let err = QueryError::unsupported("cursor pagination without an order");
//! assert!(err.is_unsupported());
//! assert!(!err.is_argument_error());
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for restriction and pagination operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Argument errors (1xxx)
    /// A required value was missing (S1001).
    ArgumentRequired = 1001,
    /// An argument was out of range (S1002).
    InvalidArgument = 1002,
    /// A cursor was built from zero keys (S1003).
    EmptyCursor = 1003,
    /// Cursor arity does not match the sort criteria (S1004).
    CursorMismatch = 1004,

    // Navigation errors (2xxx)
    /// The requested page does not exist (S2001).
    NoSuchElement = 2001,
    /// Operation is not valid in the current pagination mode (S2002).
    IllegalState = 2002,

    // Capability errors (3xxx)
    /// The backing store cannot honor the request (S3001).
    Unsupported = 3001,

    // State-access errors (4xxx)
    /// Totals were read from a page whose request did not ask for them (S4001).
    TotalNotRequested = 4001,
    /// Totals were requested but the collaborator did not supply them (S4002).
    TotalUnavailable = 4002,

    // Configuration errors (7xxx)
    /// Invalid configuration (S7001).
    InvalidConfiguration = 7001,
    /// Configuration file could not be read (S7002).
    ConfigIo = 7002,

    // Internal errors (9xxx)
    /// Internal error (S9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S1001").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ArgumentRequired => "Argument required",
            Self::InvalidArgument => "Invalid argument",
            Self::EmptyCursor => "Empty cursor",
            Self::CursorMismatch => "Cursor does not match sort criteria",
            Self::NoSuchElement => "No such page",
            Self::IllegalState => "Illegal pagination state",
            Self::Unsupported => "Unsupported by backing store",
            Self::TotalNotRequested => "Total not requested",
            Self::TotalUnavailable => "Total unavailable",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::ConfigIo => "Configuration file error",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The attribute involved.
    pub attribute: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors raised while building or navigating queries.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the attribute.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.context.attribute = Some(attribute.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// A required value was missing.
    pub fn argument_required(what: impl Into<String>) -> Self {
        let what = what.into();
        Self::new(ErrorCode::ArgumentRequired, format!("{} is required", what))
    }

    /// An argument was outside its allowed range.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// A cursor was built without any keys.
    pub fn empty_cursor() -> Self {
        Self::new(ErrorCode::EmptyCursor, "A cursor requires at least one key")
            .with_suggestion("Pass the sort-key values of the boundary entity")
    }

    /// A cursor's arity differs from the number of sort criteria.
    pub fn cursor_mismatch(keys: usize, sorts: usize) -> Self {
        Self::new(
            ErrorCode::CursorMismatch,
            format!(
                "Cursor has {} keys but the effective order has {} sort criteria",
                keys, sorts
            ),
        )
        .with_suggestion("Build the cursor from the same order used for the query")
    }

    /// No page exists in the requested direction.
    pub fn no_such_element(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoSuchElement, message)
    }

    /// The operation is not valid for the current pagination mode.
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IllegalState, message)
    }

    /// The backing store cannot honor the request.
    pub fn unsupported(what: impl Into<String>) -> Self {
        let what = what.into();
        Self::new(ErrorCode::Unsupported, format!("Not supported: {}", what))
            .with_help("Capability errors are recoverable; retry with a simpler request")
    }

    /// Totals were read from a page that was not asked to compute them.
    pub fn total_not_requested() -> Self {
        Self::new(
            ErrorCode::TotalNotRequested,
            "The page request did not ask for a total count",
        )
        .with_suggestion("Use PageRequest::with_total() when totals are needed")
    }

    /// Totals were requested but never supplied.
    pub fn total_unavailable() -> Self {
        Self::new(
            ErrorCode::TotalUnavailable,
            "The total count was requested but not provided by the query engine",
        )
    }

    /// Invalid configuration.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message))
    }

    // ============== Error Checks ==============

    /// Check if this is a construction/argument error.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ArgumentRequired
                | ErrorCode::InvalidArgument
                | ErrorCode::EmptyCursor
                | ErrorCode::CursorMismatch
        )
    }

    /// Check if this is a navigation error.
    pub fn is_navigation_error(&self) -> bool {
        matches!(self.code, ErrorCode::NoSuchElement | ErrorCode::IllegalState)
    }

    /// Check if this is a capability-absence error.
    pub fn is_unsupported(&self) -> bool {
        self.code == ErrorCode::Unsupported
    }

    /// Check if this is a state-access error.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::TotalNotRequested | ErrorCode::TotalUnavailable
        )
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref attribute) = self.context.attribute {
            output.push_str(&format!("  → Attribute: {}\n", attribute));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! query_error {
    ($code:expr, $msg:expr) => {
        $crate::error::QueryError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::QueryError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}
