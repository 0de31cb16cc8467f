use std::error::Error;
use std::pin::pin;
use std::sync::Arc;

use futures_util::TryStreamExt;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};
use tokio_postgres::{Client, Row, Statement};
use tokio_util::bytes::BytesMut;

use crate::results::ResultSet;
use crate::template::CompiledStatement;

/// Whether values of `ty` read the same as the server's text output no matter
/// how the session is configured (`DateStyle`, `TimeZone`, `bytea_output`,
/// `extra_float_digits`, `lc_monetary`, ...).
#[must_use]
pub fn renders_locally(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL | Type::INT2 | Type::INT4 | Type::INT8 | Type::OID | Type::VOID
    ) || matches!(ty.kind(), Kind::Enum(_))
        || <&str as FromSql>::accepts(ty)
}

/// A cell of a type that [`renders_locally`], decoded to its text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCell(pub String);

impl<'a> FromSql<'a> for TextCell {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let text = match *ty {
            Type::BOOL => {
                if bool::from_sql(ty, raw)? {
                    "t".to_string()
                } else {
                    "f".to_string()
                }
            }
            Type::INT2 => i16::from_sql(ty, raw)?.to_string(),
            Type::INT4 => i32::from_sql(ty, raw)?.to_string(),
            Type::INT8 => i64::from_sql(ty, raw)?.to_string(),
            Type::OID => u32::from_sql(ty, raw)?.to_string(),
            Type::VOID => String::new(),
            // the binary form of an enum value is its label
            _ if matches!(ty.kind(), Kind::Enum(_)) => std::str::from_utf8(raw)?.to_owned(),
            _ => <&str as FromSql>::from_sql(ty, raw)?.to_owned(),
        };
        Ok(TextCell(text))
    }

    fn accepts(ty: &Type) -> bool {
        renders_locally(ty)
    }
}

/// The undecoded wire bytes of a cell, passed back to the server unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCell<'a>(pub &'a [u8]);

impl<'a> FromSql<'a> for RawCell<'a> {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(RawCell(raw))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl ToSql for RawCell<'_> {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        out.extend_from_slice(self.0);
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// `SELECT $1::text, $2::text, ...`: the server's output function for each column.
fn formatter_sql(columns: usize) -> String {
    let casts: Vec<String> = (1..=columns).map(|i| format!("${i}::text")).collect();
    format!("SELECT {}", casts.join(", "))
}

/// Prepare, bind and run a compiled statement, collecting every row as text.
///
/// The statement is prepared with server-inferred parameter types, matching
/// how the text-format parameters are encoded.
///
/// # Errors
/// Returns any driver error; the caller decides whether it is statement- or
/// connection-level.
pub async fn run_statement(
    client: &Client,
    statement: &CompiledStatement,
) -> Result<ResultSet, tokio_postgres::Error> {
    let prepared = client.prepare(statement.sql()).await?;
    let stream = client
        .query_raw(&prepared, statement.params().iter().map(|p| p as &dyn ToSql))
        .await?;
    let mut stream = pin!(stream);

    let mut rows = Vec::new();
    while let Some(row) = stream.try_next().await? {
        rows.push(row);
    }
    let affected = stream
        .rows_affected()
        .unwrap_or_else(|| rows.len() as u64);

    let mut result_set = build_result_set_from_statement(client, &prepared, &rows).await?;
    result_set.set_rows_affected(affected);
    Ok(result_set)
}

/// Build a text result set using statement metadata for column names.
///
/// Columns whose text form depends on server settings are sent back to the
/// server in their binary form and cast to `text`, one round trip per row, so
/// every value reads exactly as the server prints it for this session.
///
/// # Errors
/// Returns errors from cell extraction or from the formatting query.
pub async fn build_result_set_from_statement(
    client: &Client,
    stmt: &Statement,
    rows: &[Row],
) -> Result<ResultSet, tokio_postgres::Error> {
    let columns = stmt.columns();
    let column_names: Vec<String> = columns.iter().map(|col| col.name().to_string()).collect();
    let server_formatted: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, col)| !renders_locally(col.type_()))
        .map(|(idx, _)| idx)
        .collect();

    let formatter = if server_formatted.is_empty() || rows.is_empty() {
        None
    } else {
        let types: Vec<Type> = server_formatted
            .iter()
            .map(|&idx| columns[idx].type_().clone())
            .collect();
        Some(
            client
                .prepare_typed(&formatter_sql(types.len()), &types)
                .await?,
        )
    };

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut cells: Vec<Option<String>> = Vec::with_capacity(columns.len());
        for (idx, col) in columns.iter().enumerate() {
            if renders_locally(col.type_()) {
                let cell: Option<TextCell> = row.try_get(idx)?;
                cells.push(cell.map(|TextCell(text)| text));
            } else {
                cells.push(None);
            }
        }

        if let Some(formatter) = &formatter {
            let raw = server_formatted
                .iter()
                .map(|&idx| row.try_get::<_, Option<RawCell<'_>>>(idx))
                .collect::<Result<Vec<_>, _>>()?;
            if raw.iter().any(Option::is_some) {
                let params: Vec<&(dyn ToSql + Sync)> =
                    raw.iter().map(|cell| cell as &(dyn ToSql + Sync)).collect();
                let text_row = client.query_one(formatter, &params).await?;
                for (pos, &idx) in server_formatted.iter().enumerate() {
                    cells[idx] = text_row.try_get(pos)?;
                }
            }
        }

        result_set.add_row_cells(cells);
    }

    Ok(result_set)
}
