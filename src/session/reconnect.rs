use std::thread;

use tracing::{debug, info, warn};

use crate::error::LedgerDbError;
use crate::results::ResultSet;
use crate::template::CompiledStatement;
use crate::transport::{Transport, TransportError};
use crate::types::ConnectionState;

use super::Session;

impl<T: Transport> Session<T> {
    /// Submit until the statement either succeeds or fails at statement level.
    ///
    /// Every connection loss costs one reconnect cycle (reconnect, replay identity)
    /// followed by one resubmission.
    pub(super) fn submit(
        &mut self,
        statement: &CompiledStatement,
    ) -> Result<ResultSet, LedgerDbError> {
        loop {
            if self.state != ConnectionState::Connected {
                self.recover()?;
            }
            match self.transport.execute(statement) {
                Ok(result) => return Ok(result),
                Err(TransportError::Statement(msg)) => {
                    warn!(error = %msg, sql = statement.sql(), "PostgreSQL query failed");
                    return Err(LedgerDbError::ExecutionError(msg));
                }
                Err(TransportError::ConnectionLost(msg)) => {
                    warn!(error = %msg, sql = statement.sql(), "PostgreSQL query failed");
                    self.state = ConnectionState::Fatal;
                }
            }
        }
    }

    /// Reconnect and replay the session identity.
    ///
    /// Connection loss during the replay starts another cycle; a rejected replay
    /// poisons the session.
    fn recover(&mut self) -> Result<(), LedgerDbError> {
        loop {
            self.reconnect_loop()?;
            let Some(statement) = self.context.replay_statement().cloned() else {
                return Ok(());
            };
            match self.transport.execute(&statement) {
                Ok(_) => {
                    debug!(identity = self.context.identity().unwrap_or(""), "session identity replayed");
                    return Ok(());
                }
                Err(TransportError::ConnectionLost(msg)) => {
                    warn!(error = %msg, "connection lost while replaying session identity");
                    self.state = ConnectionState::Fatal;
                }
                Err(TransportError::Statement(msg)) => return Err(self.poison(msg)),
            }
        }
    }

    /// Block until the transport reports `Connected`, pausing `reconnect_delay`
    /// between attempts. Unbounded unless `max_reconnect_attempts` is set.
    fn reconnect_loop(&mut self) -> Result<(), LedgerDbError> {
        self.state = ConnectionState::Fatal;
        warn!("Resetting database connection");

        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            if let Err(e) = self.transport.reconnect() {
                debug!(attempt = attempts, error = %e, "reconnect attempt failed");
            }

            if self.transport.status() == ConnectionState::Connected {
                self.state = ConnectionState::Connected;
                info!(attempts, "Database connection OK");
                return Ok(());
            }

            if let Some(max) = self.options.max_reconnect_attempts
                && attempts >= max
            {
                warn!(attempts, "giving up on reconnecting");
                return Err(LedgerDbError::ReconnectExhausted { attempts });
            }

            thread::sleep(self.options.reconnect_delay);
        }
    }
}
