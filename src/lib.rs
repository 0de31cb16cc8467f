//! A resilient, synchronous templated-query layer for a PostgreSQL-backed ledger terminal.
//!
//! - [`template`] compiles printf-like templates (`%s %d %u %zu %l %f %B`, `%%`) into
//!   positionally bound statements.
//! - [`Session`] owns the single connection, re-applies the session identity after every
//!   reconnect, and blocks through connection loss instead of failing the caller.
//! - The most recent [`ResultSet`] is kept for `row_count`/`value` style access.

#[macro_use]
mod macros;

pub mod config;
pub mod error;
pub mod prelude;
pub mod results;
pub mod session;
pub mod template;
pub mod transport;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConnectionConfig, SessionOptions};
pub use error::{LedgerDbError, TemplateError};
pub use results::{ResultSet, TextRow};
pub use session::{Session, SessionContext};
pub use template::{BoundParameter, CompiledStatement, Template, compile};
pub use transport::{Transport, TransportError};
pub use types::{ConnectionState, PlaceholderKind, SqlArg};

#[cfg(feature = "postgres")]
pub use postgres::PostgresTransport;
#[cfg(feature = "postgres")]
pub use session::PgSession;
