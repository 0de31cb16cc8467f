use thiserror::Error;

use crate::types::PlaceholderKind;

/// Programmer errors detected while compiling a statement template.
///
/// None of these are retried: they mean the call site is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder '%{found}' at byte {position}")]
    UnknownPlaceholder { position: usize, found: char },

    #[error("template ends inside a placeholder starting at byte {position}")]
    DanglingPercent { position: usize },

    #[error("size modifier at byte {position} must be followed by 'u', found '{found}'")]
    UnsupportedSizeModifier { position: usize, found: char },

    #[error("template uses more than {max} placeholders")]
    TooManyPlaceholders { max: usize },

    #[error("rewritten statement is {len} bytes, limit is {max}")]
    StatementTooLong { len: usize, max: usize },

    #[error("template expects {expected} arguments, {supplied} supplied")]
    ArgumentCount { expected: usize, supplied: usize },

    #[error("argument ${position} expects {expected}, got {supplied}")]
    ArgumentKind {
        position: usize,
        expected: PlaceholderKind,
        supplied: PlaceholderKind,
    },
}

#[derive(Debug, Error)]
pub enum LedgerDbError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[error(transparent)]
    TemplateError(#[from] TemplateError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    /// The session identity could not be applied; the session refuses further work.
    #[error("Session identity error: {0}")]
    IdentityError(String),

    #[error("Gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    #[error("Other database error: {0}")]
    Other(String),
}

impl LedgerDbError {
    /// True for errors after which the process should not keep serving requests.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerDbError::IdentityError(_))
    }
}
