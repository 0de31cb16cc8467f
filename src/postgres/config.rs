use std::str::FromStr;

use tokio_postgres::Config as PgConfig;

use crate::config::ConnectionConfig;
use crate::error::LedgerDbError;

/// Socket directory libpq falls back to when no host is given.
#[cfg(unix)]
const DEFAULT_SOCKET_DIR: &str = "/var/run/postgresql";

impl ConnectionConfig {
    /// Parse the conninfo into a driver config, applying libpq's defaults.
    ///
    /// # Errors
    /// Returns `LedgerDbError::ConfigError` if the conninfo does not parse or no user is given.
    pub fn pg_config(&self) -> Result<PgConfig, LedgerDbError> {
        self.validate()?;

        let mut pg_config = PgConfig::from_str(&self.conninfo)
            .map_err(|e| LedgerDbError::ConfigError(format!("invalid conninfo: {e}")))?;

        if pg_config.get_user().is_none() {
            return Err(LedgerDbError::ConfigError(
                "user is required".to_string(),
            ));
        }

        if pg_config.get_hosts().is_empty() && pg_config.get_hostaddrs().is_empty() {
            #[cfg(unix)]
            {
                pg_config.host_path(DEFAULT_SOCKET_DIR);
            }
            #[cfg(not(unix))]
            {
                pg_config.host("localhost");
            }
        }

        if pg_config.get_application_name().is_none() {
            pg_config.application_name(env!("CARGO_PKG_NAME"));
        }

        Ok(pg_config)
    }
}
