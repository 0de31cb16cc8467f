//! The connection manager: one connection, one session identity, one live result set.

use tracing::debug;

mod identity;
mod reconnect;
mod tx;

pub use identity::SessionContext;

use crate::config::SessionOptions;
use crate::error::LedgerDbError;
use crate::results::ResultSet;
use crate::template::{CompiledStatement, Template};
use crate::transport::Transport;
use crate::types::{ConnectionState, SqlArg};

#[cfg(feature = "postgres")]
use crate::config::ConnectionConfig;
#[cfg(feature = "postgres")]
use crate::postgres::PostgresTransport;

/// A session against the production PostgreSQL transport.
#[cfg(feature = "postgres")]
pub type PgSession = Session<PostgresTransport>;

/// Serialized access to a single database connection.
///
/// `execute` compiles a template, submits it, survives connection loss by
/// reconnecting and replaying the session identity, and keeps the result for
/// the accessors until the next statement:
/// ```rust
/// use ledger_sql::prelude::*;
/// use ledger_sql::test_utils::{ScriptedReply, ScriptedTransport};
///
/// let transport = ScriptedTransport::new().reply(ScriptedReply::Echo);
/// let mut session = Session::new(transport, SessionOptions::default()).unwrap();
///
/// let rows = execute!(session, "SELECT %s::INTEGER", "42").unwrap();
/// assert_eq!(rows, 1);
/// assert_eq!(session.row_count(), 1);
/// assert_eq!(session.value(0, 0), "42");
/// ```
pub struct Session<T: Transport> {
    transport: T,
    state: ConnectionState,
    context: SessionContext,
    result: Option<ResultSet>,
    options: SessionOptions,
    poisoned: Option<String>,
}

#[cfg(feature = "postgres")]
impl Session<PostgresTransport> {
    /// Open the initial PostgreSQL connection.
    ///
    /// # Errors
    /// Returns `LedgerDbError::ConfigError` for invalid configuration and
    /// `LedgerDbError::ConnectionError` if the first connection attempt fails; the
    /// reconnect loop only covers connections that were established once.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, LedgerDbError> {
        config.validate()?;
        let transport = PostgresTransport::connect(config)?;
        tracing::info!("database connection established");
        Self::new(transport, config.session.clone())
    }
}

impl<T: Transport> Session<T> {
    /// Wrap an already connected transport.
    ///
    /// # Errors
    /// Returns `LedgerDbError::ConfigError` if the options are invalid.
    pub fn new(transport: T, options: SessionOptions) -> Result<Self, LedgerDbError> {
        options.validate()?;
        let state = transport.status();
        Ok(Self {
            transport,
            state,
            context: SessionContext::default(),
            result: None,
            options,
            poisoned: None,
        })
    }

    /// Compile `template` with `args`, run it, and return the affected-row count.
    ///
    /// The previous result set is discarded first. On a statement-level failure
    /// there is no result afterwards and the caller decides what to do (typically
    /// `ROLLBACK`). Connection loss is handled internally and only costs latency.
    ///
    /// # Errors
    /// - `LedgerDbError::TemplateError` if the template or arguments are wrong; nothing is sent.
    /// - `LedgerDbError::ExecutionError` if the server rejected the statement.
    /// - `LedgerDbError::IdentityError` if the session identity could not be applied.
    /// - `LedgerDbError::ReconnectExhausted` if a reconnect ceiling is configured and was hit.
    pub fn execute(&mut self, template: &str, args: &[SqlArg<'_>]) -> Result<u64, LedgerDbError> {
        self.result = None;
        let statement = Template::parse(template)?.compile(args)?;
        self.execute_compiled(&statement)
    }

    /// Like [`Session::execute`] for a template parsed once and reused.
    ///
    /// # Errors
    /// Same as [`Session::execute`].
    pub fn execute_template(
        &mut self,
        template: &Template,
        args: &[SqlArg<'_>],
    ) -> Result<u64, LedgerDbError> {
        self.result = None;
        let statement = template.compile(args)?;
        self.execute_compiled(&statement)
    }

    /// Run an already compiled statement.
    ///
    /// # Errors
    /// Same as [`Session::execute`], minus template errors.
    pub fn execute_compiled(&mut self, statement: &CompiledStatement) -> Result<u64, LedgerDbError> {
        self.result = None;
        self.ensure_usable()?;
        debug!(sql = statement.sql(), params = statement.params().len(), "submitting statement");

        let result = self.submit(statement)?;
        let affected = result.rows_affected();
        self.result = Some(result);
        Ok(affected)
    }

    /// Set (or clear) the acting identity and apply it to the database session now.
    ///
    /// The identity is re-applied after every reconnect. If the server rejects it,
    /// the session is poisoned and refuses all further statements.
    ///
    /// # Errors
    /// - `LedgerDbError::IdentityError` if the identity could not be applied.
    /// - `LedgerDbError::TemplateError` if the identity is too long to bind.
    /// - `LedgerDbError::ReconnectExhausted` as for [`Session::execute`].
    pub fn set_identity(&mut self, identity: Option<&str>) -> Result<(), LedgerDbError> {
        self.result = None;
        self.ensure_usable()?;
        let statement = SessionContext::statement_for(&self.options.identity_setting, identity)?;
        self.context.set(identity, statement.clone());

        match self.submit(&statement) {
            Ok(_) => {
                debug!(identity = identity.unwrap_or(""), "session identity applied");
                Ok(())
            }
            Err(LedgerDbError::ExecutionError(msg)) => Err(self.poison(msg)),
            Err(e) => Err(e),
        }
    }

    /// The identity most recently set, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.context.identity()
    }

    /// Number of rows in the current result; 0 when there is none.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.result.as_ref().map_or(0, ResultSet::row_count)
    }

    /// Number of columns in the current result; 0 when there is none.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.result.as_ref().map_or(0, ResultSet::column_count)
    }

    /// Affected-row count of the current result; 0 when there is none.
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.result.as_ref().map_or(0, ResultSet::rows_affected)
    }

    /// Text of cell (`row`, `col`) of the current result. NULL reads as `""`.
    ///
    /// # Panics
    /// Panics if `row >= row_count()` or `col >= column_count()`, including when there
    /// is no current result: asking for a row that does not exist is a caller bug.
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> &str {
        self.current(row).value(row, col)
    }

    /// Whether cell (`row`, `col`) of the current result is SQL NULL.
    ///
    /// # Panics
    /// Same bounds rules as [`Session::value`].
    #[must_use]
    pub fn is_null(&self, row: usize, col: usize) -> bool {
        self.current(row).is_null(row, col)
    }

    /// Name of column `col` of the current result.
    ///
    /// # Panics
    /// Panics if there is no current result or `col >= column_count()`.
    #[must_use]
    pub fn column_name(&self, col: usize) -> &str {
        match &self.result {
            Some(result) => result.column_name(col),
            None => panic!("column {col} requested but there is no current result"),
        }
    }

    /// Borrow the current result set.
    #[must_use]
    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether a failed identity application has disabled this session.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn current(&self, row: usize) -> &ResultSet {
        match &self.result {
            Some(result) => result,
            None => panic!("row {row} out of range for result with 0 rows"),
        }
    }

    fn ensure_usable(&self) -> Result<(), LedgerDbError> {
        match &self.poisoned {
            Some(msg) => Err(LedgerDbError::IdentityError(msg.clone())),
            None => Ok(()),
        }
    }

    fn poison(&mut self, msg: String) -> LedgerDbError {
        tracing::error!(error = %msg, "session identity could not be applied");
        self.poisoned = Some(msg.clone());
        LedgerDbError::IdentityError(msg)
    }
}
