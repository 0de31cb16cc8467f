use thiserror::Error;

use crate::results::ResultSet;
use crate::template::CompiledStatement;
use crate::types::ConnectionState;

/// How a submission failed, from the session's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The statement was rejected but the connection is still usable.
    #[error("statement failed: {0}")]
    Statement(String),
    /// The connection itself is gone.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}

/// The synchronous database interface the session drives.
///
/// Implementations own exactly one connection. The session never calls them
/// concurrently.
pub trait Transport {
    /// Submit a compiled statement with its parameters and collect every row as text.
    ///
    /// # Errors
    /// `TransportError::Statement` for statement-level failures,
    /// `TransportError::ConnectionLost` when the connection is unusable.
    fn execute(&mut self, statement: &CompiledStatement) -> Result<ResultSet, TransportError>;

    /// Current connection status; `Connected` or `Fatal` once a connection has existed.
    fn status(&self) -> ConnectionState;

    /// Make one attempt to re-establish the connection.
    ///
    /// # Errors
    /// Returns `TransportError::ConnectionLost` if the attempt failed.
    fn reconnect(&mut self) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&mut self, statement: &CompiledStatement) -> Result<ResultSet, TransportError> {
        (**self).execute(statement)
    }

    fn status(&self) -> ConnectionState {
        (**self).status()
    }

    fn reconnect(&mut self) -> Result<(), TransportError> {
        (**self).reconnect()
    }
}
