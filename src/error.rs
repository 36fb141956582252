use itertools::Itertools as _;
use thiserror::Error;

use crate::lr::{Action, StateId};
use crate::rule::RuleId;
use crate::span::Span;

pub type Result<T> = std::result::Result<T, self::Error>;

#[derive(Debug, Clone)]
pub struct ExpectedSymbols(pub Vec<String>);

impl std::fmt::Display for ExpectedSymbols {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.iter().join(", ").fmt(f)
    }
}

/// A parse that ran into a token without an action.
///
/// Carries everything the caller needs for a diagnostic: the offending
/// position, the terminals the failing state would have accepted, a short
/// preview of the upcoming tokens and the reductions emitted so far.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub span: Span,
    pub got: String,
    pub expected: ExpectedSymbols,
    pub preview: Vec<String>,
    pub trace: Vec<RuleId>,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unexpected {} at {}, expecting {}",
            self.got, self.span, self.expected
        )?;
        if !self.preview.is_empty() {
            write!(f, " (next: {})", self.preview.iter().join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Error, Debug, Clone)]
pub enum ErrorKind {
    #[error("invalid non-terminal name {0:?}: non-terminals must start with an uppercase letter")]
    InvalidNonTerminal(String),

    #[error("the start symbol is already set to {0}")]
    StartAlreadySet(String),

    #[error("no start symbol has been set")]
    MissingStart,

    #[error("the start symbol {0} has no production")]
    MissingStartRule(String),

    #[error("non-terminal {0} is referenced but has no production")]
    UndefinedNonTerminal(String),

    #[error("unknown symbol {0}")]
    UnknownSymbol(String),

    #[error("the grammar must be analyzed before table construction")]
    UnanalyzedGrammar,

    #[error("shift-reduce conflict in state {state} on symbol {symbol} {conflict:?}: the grammar is not LR(1)")]
    ShiftReduceConflict {
        state: StateId,
        symbol: String,
        conflict: [Action; 2],
    },

    #[error("reduce-reduce conflict in state {state} on symbol {symbol} {conflict:?}: the grammar is not LR(1)")]
    ReduceReduceConflict {
        state: StateId,
        symbol: String,
        conflict: [Action; 2],
    },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    /// Location of the error in the input stream, when there is one.
    span: Option<Span>,
}

impl Error {
    pub fn new(kind: impl Into<ErrorKind>, span: Option<Span>) -> Self {
        Self {
            kind: kind.into(),
            span,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, span: None }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for Error {}
