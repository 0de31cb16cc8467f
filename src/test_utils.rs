//! Test utilities: a scripted in-memory transport for exercising the session
//! without a database server.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::results::ResultSet;
use crate::template::{BoundParameter, CompiledStatement};
use crate::transport::{Transport, TransportError};
use crate::types::ConnectionState;

/// What the scripted transport does with the next statement.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this result set
    Rows(ResultSet),
    /// Return one row whose cells are the text of each bound parameter
    Echo,
    /// Reject the statement; the connection stays up
    Fail(String),
    /// Drop the connection
    Disconnect(String),
}

impl ScriptedReply {
    /// A result set built from column names and text rows (`rows_affected` = row count).
    #[must_use]
    pub fn rows(columns: &[&str], rows: &[&[Option<&str>]]) -> Self {
        let mut result = ResultSet::with_capacity(rows.len());
        result.set_column_names(Arc::new(columns.iter().map(|c| (*c).to_string()).collect()));
        for row in rows {
            result.add_row_cells(row.iter().map(|cell| cell.map(str::to_owned)).collect());
        }
        result.set_rows_affected(rows.len() as u64);
        ScriptedReply::Rows(result)
    }
}

/// Something the scripted transport observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Executed {
        sql: String,
        params: Vec<BoundParameter>,
    },
    Reconnect {
        succeeded: bool,
    },
}

/// In-memory transport that plays back a queue of replies.
///
/// Once the queue is empty every statement succeeds with an empty result.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    replies: VecDeque<ScriptedReply>,
    failing_reconnects: u32,
    drop_after: Option<usize>,
    connected: bool,
    events: Vec<TransportEvent>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            replies: VecDeque::new(),
            failing_reconnects: 0,
            drop_after: None,
            connected: true,
            events: Vec::new(),
        }
    }

    /// Queue the reply for the next unanswered statement.
    #[must_use]
    pub fn reply(mut self, reply: ScriptedReply) -> Self {
        self.replies.push_back(reply);
        self
    }

    /// Make the next `count` reconnect attempts fail.
    #[must_use]
    pub fn failing_reconnects(mut self, count: u32) -> Self {
        self.failing_reconnects = count;
        self
    }

    /// Start without a connection.
    #[must_use]
    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    /// Drop the connection silently once `statements` submissions have been answered,
    /// so the next submission finds it already gone.
    #[must_use]
    pub fn drop_after(mut self, statements: usize) -> Self {
        self.drop_after = Some(statements);
        self
    }

    #[must_use]
    pub fn events(&self) -> &[TransportEvent] {
        &self.events
    }

    /// Statement text of every submission, in order.
    #[must_use]
    pub fn executed_sql(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TransportEvent::Executed { sql, .. } => Some(sql.clone()),
                TransportEvent::Reconnect { .. } => None,
            })
            .collect()
    }

    /// Parameters of the most recent submission.
    #[must_use]
    pub fn last_params(&self) -> Option<&[BoundParameter]> {
        self.events.iter().rev().find_map(|event| match event {
            TransportEvent::Executed { params, .. } => Some(params.as_slice()),
            TransportEvent::Reconnect { .. } => None,
        })
    }

    #[must_use]
    pub fn reconnect_attempts(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TransportEvent::Reconnect { .. }))
            .count()
    }
}

fn echo(statement: &CompiledStatement) -> ResultSet {
    let params = statement.params();
    let mut result = ResultSet::with_capacity(1);
    result.set_column_names(Arc::new(
        (1..=params.len()).map(|i| format!("?column{i}?")).collect(),
    ));
    result.add_row_cells(
        params
            .iter()
            .map(|p| p.bytes().map(|b| String::from_utf8_lossy(b).into_owned()))
            .collect(),
    );
    result.set_rows_affected(1);
    result
}

impl Transport for ScriptedTransport {
    fn execute(&mut self, statement: &CompiledStatement) -> Result<ResultSet, TransportError> {
        if !self.connected {
            return Err(TransportError::ConnectionLost(
                "no connection to the server".to_string(),
            ));
        }
        self.events.push(TransportEvent::Executed {
            sql: statement.sql().to_string(),
            params: statement.params().to_vec(),
        });

        let outcome = match self.replies.pop_front() {
            None => Ok(ResultSet::default()),
            Some(ScriptedReply::Rows(result)) => Ok(result),
            Some(ScriptedReply::Echo) => Ok(echo(statement)),
            Some(ScriptedReply::Fail(msg)) => Err(TransportError::Statement(msg)),
            Some(ScriptedReply::Disconnect(msg)) => {
                self.connected = false;
                Err(TransportError::ConnectionLost(msg))
            }
        };

        let submitted = self.executed_sql().len();
        if self.drop_after == Some(submitted) {
            self.drop_after = None;
            self.connected = false;
        }
        outcome
    }

    fn status(&self) -> ConnectionState {
        if self.connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Fatal
        }
    }

    fn reconnect(&mut self) -> Result<(), TransportError> {
        if self.failing_reconnects > 0 {
            self.failing_reconnects -= 1;
            self.events.push(TransportEvent::Reconnect { succeeded: false });
            return Err(TransportError::ConnectionLost(
                "could not connect to server".to_string(),
            ));
        }
        self.connected = true;
        self.events.push(TransportEvent::Reconnect { succeeded: true });
        Ok(())
    }
}
