use std::error::Error;

use tokio_postgres::types::{Format, IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::template::{BoundParameter, ParamFormat};

/// Bound parameters go out as raw bytes, in text format unless they are blobs.
///
/// The statement is prepared without declared parameter types, so the server
/// infers each type and parses the text itself, which is why every type is accepted.
impl ToSql for BoundParameter {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self.bytes() {
            Some(raw) => {
                out.extend_from_slice(raw);
                Ok(IsNull::No)
            }
            None => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        match self.format() {
            ParamFormat::Text => Format::Text,
            ParamFormat::Binary => Format::Binary,
        }
    }

    to_sql_checked!();
}
