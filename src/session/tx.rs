use tracing::warn;

use crate::error::LedgerDbError;
use crate::transport::Transport;

use super::Session;

impl<T: Transport> Session<T> {
    /// Run `body` between `BEGIN` and `COMMIT`, issuing `ROLLBACK` if it fails.
    ///
    /// A failing `ROLLBACK` is logged and the original error returned. A reconnect
    /// inside `body` loses the server-side transaction, so later statements of
    /// the body run in autocommit mode.
    ///
    /// ```rust
    /// use ledger_sql::prelude::*;
    /// use ledger_sql::test_utils::ScriptedTransport;
    ///
    /// let mut session = Session::new(ScriptedTransport::new(), SessionOptions::default()).unwrap();
    /// let user_id = 12_i32;
    /// session
    ///     .transaction(|tx| {
    ///         execute!(tx, "INSERT INTO transactions DEFAULT VALUES")?;
    ///         execute!(tx, "INSERT INTO transaction_lines (transaction, debit_account, amount) VALUES (LASTVAL(), %d, 35)", user_id)?;
    ///         Ok(())
    ///     })
    ///     .unwrap();
    /// assert_eq!(session.transport().executed_sql().first().map(String::as_str), Some("BEGIN"));
    /// assert_eq!(session.transport().executed_sql().last().map(String::as_str), Some("COMMIT"));
    /// ```
    ///
    /// # Errors
    /// Returns the error from `BEGIN`, from `body`, or from `COMMIT`.
    pub fn transaction<R, F>(&mut self, body: F) -> Result<R, LedgerDbError>
    where
        F: FnOnce(&mut Self) -> Result<R, LedgerDbError>,
    {
        self.execute("BEGIN", &[])?;

        let outcome = body(self).and_then(|value| self.execute("COMMIT", &[]).map(|_| value));
        match outcome {
            Ok(value) => Ok(value),
            Err(err) => {
                if let Err(rollback_err) = self.execute("ROLLBACK", &[]) {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}
