//! Error taxonomies for the three domains the router can fail in: parsing a
//! pattern at registration time, resolving an argument vector against the
//! table, and converting a bound parameter to its declared type.

use std::fmt;

/// One character-offset span into a pattern string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub position: usize,
    pub length: usize,
}

impl Span {
    pub fn new(position: usize, length: usize) -> Self {
        Self { position, length }
    }

    pub fn point(position: usize) -> Self {
        Self { position, length: 1 }
    }
}

/// A single problem found while parsing a pattern. Carries enough detail to
/// print a caret diagnostic under the offending pattern text.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub suggestion: Option<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("'<{0}>' is not a parameter; use '{{{0}}}'")]
    InvalidParameterSyntax(String),
    #[error("unmatched '{0}'")]
    UnmatchedBrace(char),
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("'{0}' is not a valid type constraint")]
    InvalidTypeConstraint(String),
    #[error("option alias '{0}' is already used in this pattern")]
    DuplicateOptionAlias(String),
    #[error("catch-all parameter '*{0}' must be the last segment")]
    CatchAllNotLast(String),
    #[error("expected {0}")]
    MissingRequiredToken(String),
    #[error("'--' cannot appear as a pattern literal; it is reserved for end-of-options at match time")]
    EndOfOptionsLiteral,
}

/// Why `resolve` found no matching endpoint at all. Only ever surfaced when
/// *no* registered endpoint matched the argument vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NoMatchReason {
    #[error("unknown command")]
    UnknownCommand,
    #[error("missing required argument '{0}'")]
    MissingRequiredArgument(String),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("option '{0}' requires a value")]
    OptionMissingValue(String),
    #[error("invalid value '{value}' for parameter '{parameter}': {source}")]
    ConversionFailure {
        parameter: String,
        value: String,
        source: ConversionError,
    },
    #[error("ambiguous match between multiple equally specific routes")]
    AmbiguousMatch,
}

/// Why a type converter rejected a raw argument string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("no converter registered for type '{0}'")]
    UnknownType(String),
    #[error("'{value}' is not a valid {type_name}")]
    InvalidFormat { value: String, type_name: String },
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.position, self.position + self.length)
    }
}
