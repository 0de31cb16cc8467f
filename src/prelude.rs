//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{ConnectionConfig, SessionOptions};
pub use crate::error::{LedgerDbError, TemplateError};
pub use crate::execute;
pub use crate::results::{ResultSet, TextRow};
pub use crate::session::Session;
pub use crate::template::{CompiledStatement, Template, compile};
pub use crate::transport::{Transport, TransportError};
pub use crate::types::{ConnectionState, PlaceholderKind, SqlArg};

#[cfg(feature = "postgres")]
pub use crate::postgres::PostgresTransport;
#[cfg(feature = "postgres")]
pub use crate::session::PgSession;
