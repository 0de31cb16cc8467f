use std::time::Duration;

use serde::Serialize;

use crate::error::LedgerDbError;

/// Environment variable consulted by [`ConnectionConfig::from_env`].
pub const DATABASE_URL_ENV: &str = "LEDGER_DATABASE_URL";

/// Setting written by `set_identity` unless configured otherwise.
pub const DEFAULT_IDENTITY_SETTING: &str = "ledger.identity";

/// Behaviour of a session independent of the transport.
///
/// ```rust
/// use std::time::Duration;
/// use ledger_sql::prelude::*;
///
/// let options = SessionOptions::default()
///     .with_reconnect_delay(Duration::from_millis(250))
///     .with_max_reconnect_attempts(Some(20));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOptions {
    /// Pause between reconnect attempts
    pub reconnect_delay: Duration,
    /// `None` keeps reconnecting forever
    pub max_reconnect_attempts: Option<u32>,
    /// Custom setting that carries the acting identity, e.g. `ledger.identity`
    pub identity_setting: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_attempts: None,
            identity_setting: DEFAULT_IDENTITY_SETTING.to_string(),
        }
    }
}

impl SessionOptions {
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_reconnect_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_identity_setting(mut self, setting: impl Into<String>) -> Self {
        self.identity_setting = setting.into();
        self
    }

    /// Check the options for values the session cannot work with.
    ///
    /// # Errors
    /// Returns `LedgerDbError::ConfigError` for a zero reconnect ceiling or an identity
    /// setting that is not a qualified custom setting name.
    pub fn validate(&self) -> Result<(), LedgerDbError> {
        if self.max_reconnect_attempts == Some(0) {
            return Err(LedgerDbError::ConfigError(
                "max_reconnect_attempts must be at least 1".to_string(),
            ));
        }
        let valid_setting = self.identity_setting.split_once('.').is_some_and(|(prefix, name)| {
            !prefix.is_empty()
                && !name.is_empty()
                && self
                    .identity_setting
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
        });
        if !valid_setting {
            return Err(LedgerDbError::ConfigError(format!(
                "identity_setting must look like 'prefix.name', got '{}'",
                self.identity_setting
            )));
        }
        Ok(())
    }
}

/// Everything needed to open a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionConfig {
    /// libpq-style `key=value` string or `postgresql://` URL; never serialized
    #[serde(skip_serializing)]
    pub conninfo: String,
    #[serde(flatten)]
    pub session: SessionOptions,
}

impl ConnectionConfig {
    #[must_use]
    pub fn new(conninfo: impl Into<String>) -> Self {
        Self {
            conninfo: conninfo.into(),
            session: SessionOptions::default(),
        }
    }

    /// Read the conninfo from `LEDGER_DATABASE_URL`.
    ///
    /// # Errors
    /// Returns `LedgerDbError::ConfigError` if the variable is unset or empty.
    pub fn from_env() -> Result<Self, LedgerDbError> {
        match std::env::var(DATABASE_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Ok(Self::new(value)),
            _ => Err(LedgerDbError::ConfigError(format!(
                "{DATABASE_URL_ENV} is not set"
            ))),
        }
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionOptions) -> Self {
        self.session = session;
        self
    }

    /// # Errors
    /// Returns `LedgerDbError::ConfigError` if the conninfo is empty or the session
    /// options are invalid.
    pub fn validate(&self) -> Result<(), LedgerDbError> {
        if self.conninfo.trim().is_empty() {
            return Err(LedgerDbError::ConfigError(
                "conninfo is required".to_string(),
            ));
        }
        self.session.validate()
    }
}
