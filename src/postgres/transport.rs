use tokio::runtime::{Builder, Runtime};
use tokio_postgres::{Client, Config as PgConfig, NoTls};

use crate::config::ConnectionConfig;
use crate::error::LedgerDbError;
use crate::results::ResultSet;
use crate::template::CompiledStatement;
use crate::transport::{Transport, TransportError};
use crate::types::ConnectionState;

use super::query::run_statement;

/// A single PostgreSQL connection driven synchronously.
///
/// Owns a current-thread runtime and blocks on it for every operation, so the
/// connection task only makes progress while a call is in flight.
pub struct PostgresTransport {
    runtime: Runtime,
    pg_config: PgConfig,
    client: Option<Client>,
}

impl std::fmt::Debug for PostgresTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTransport")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl PostgresTransport {
    /// Open the initial connection.
    ///
    /// # Errors
    /// Returns `LedgerDbError::ConfigError` for an unusable conninfo and
    /// `LedgerDbError::ConnectionError` if the runtime cannot be built or the server
    /// cannot be reached.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, LedgerDbError> {
        let pg_config = config.pg_config()?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                LedgerDbError::ConnectionError(format!("Failed to build runtime: {e}"))
            })?;

        let client = runtime.block_on(open_client(&pg_config)).map_err(|e| {
            LedgerDbError::ConnectionError(format!("PostgreSQL connection failed: {e}"))
        })?;

        Ok(Self {
            runtime,
            pg_config,
            client: Some(client),
        })
    }
}

async fn open_client(pg_config: &PgConfig) -> Result<Client, tokio_postgres::Error> {
    let (client, connection) = pg_config.connect(NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::warn!(error = %e, "postgres connection task ended");
        }
    });
    Ok(client)
}

/// Split a driver error into statement-level and connection-level failures.
fn classify(client: &Client, err: &tokio_postgres::Error) -> TransportError {
    let io_failure = std::error::Error::source(err).is_some_and(|src| src.is::<std::io::Error>());
    if err.is_closed() || io_failure || client.is_closed() {
        return TransportError::ConnectionLost(err.to_string());
    }
    match err.as_db_error() {
        Some(db) if ends_session(db.code().code()) => {
            TransportError::ConnectionLost(format!("{}: {}", db.code().code(), db.message()))
        }
        Some(db) => TransportError::Statement(format!("{}: {}", db.code().code(), db.message())),
        None => TransportError::Statement(err.to_string()),
    }
}

/// SQLSTATEs after which the server has dropped, or is about to drop, the session:
/// class 08 (connection exception) and the 57P0x shutdown/termination codes.
fn ends_session(sqlstate: &str) -> bool {
    sqlstate.starts_with("08") || matches!(sqlstate, "57P01" | "57P02" | "57P03" | "57P05")
}

impl Transport for PostgresTransport {
    fn execute(&mut self, statement: &CompiledStatement) -> Result<ResultSet, TransportError> {
        let Some(client) = self.client.as_ref() else {
            return Err(TransportError::ConnectionLost(
                "no open connection".to_string(),
            ));
        };
        self.runtime
            .block_on(run_statement(client, statement))
            .map_err(|e| classify(client, &e))
    }

    fn status(&self) -> ConnectionState {
        match &self.client {
            Some(client) if !client.is_closed() => ConnectionState::Connected,
            Some(_) => ConnectionState::Fatal,
            None => ConnectionState::Disconnected,
        }
    }

    fn reconnect(&mut self) -> Result<(), TransportError> {
        self.client = None;
        let client = self
            .runtime
            .block_on(open_client(&self.pg_config))
            .map_err(|e| TransportError::ConnectionLost(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }
}
