// PostgreSQL module - the production transport
//
// - config: conninfo parsing and libpq-style defaults
// - params: binding compiled parameters in text/binary format
// - query: statement execution and text extraction of cells
// - transport: the synchronous connection wrapper the session drives

pub mod config;
pub mod params;
pub mod query;
pub mod transport;

pub use query::{TextCell, build_result_set_from_statement, run_statement};
pub use transport::PostgresTransport;
