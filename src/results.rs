//! Text result sets returned by the session.
//!
//! Every cell is kept as the text the server's type renders to, so callers never
//! deal with driver types. Exactly one `ResultSet` is live per session.

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::TextRow;
