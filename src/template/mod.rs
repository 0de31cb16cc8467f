use std::fmt::Write as _;

mod params;
mod scanner;

pub use params::{BoundParameter, ParamFormat};

use crate::error::TemplateError;
use crate::types::{PlaceholderKind, SqlArg};
use scanner::{Directive, marker_len, scan_directive};

/// Most placeholders a single template may use (`$1` through `$10`).
pub const MAX_PLACEHOLDERS: usize = 10;

/// Longest rewritten statement accepted, in bytes.
pub const MAX_STATEMENT_LEN: usize = 4095;

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal SQL text (with `%%` already folded to `%`)
    Literal(String),
    Placeholder(PlaceholderKind),
}

/// A parsed printf-like statement template.
///
/// `%s %d %u %zu %l %f %B` are typed placeholders, `%%` is a literal percent sign.
/// Each placeholder becomes the next positional marker:
/// ```rust
/// use ledger_sql::prelude::*;
///
/// let template = Template::parse("SELECT name FROM accounts WHERE id = %d OR name LIKE 'a%%'").unwrap();
/// assert_eq!(template.sql(), "SELECT name FROM accounts WHERE id = $1 OR name LIKE 'a%'");
/// assert_eq!(template.kinds(), &[PlaceholderKind::Int]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    kinds: Vec<PlaceholderKind>,
    sql: String,
}

impl Template {
    /// Parse a template and build its rewritten statement text.
    ///
    /// # Errors
    /// Returns `TemplateError` for unknown or truncated directives, more than
    /// [`MAX_PLACEHOLDERS`] placeholders, or a rewritten statement longer than
    /// [`MAX_STATEMENT_LEN`].
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut kinds = Vec::new();
        let mut literal = String::new();
        let mut len = 0;
        let mut offset = 0;
        let mut rest = template;

        while let Some(pos) = rest.find('%') {
            literal.push_str(&rest[..pos]);
            let (directive, consumed) = scan_directive(&rest[pos + 1..], offset + pos)?;
            match directive {
                Directive::Percent => literal.push('%'),
                Directive::Placeholder(kind) => {
                    if kinds.len() == MAX_PLACEHOLDERS {
                        return Err(TemplateError::TooManyPlaceholders {
                            max: MAX_PLACEHOLDERS,
                        });
                    }
                    if !literal.is_empty() {
                        len += literal.len();
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    kinds.push(kind);
                    len += marker_len(kinds.len());
                    segments.push(Segment::Placeholder(kind));
                }
            }
            offset += pos + 1 + consumed;
            rest = &rest[pos + 1 + consumed..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            len += literal.len();
            segments.push(Segment::Literal(literal));
        }

        if len > MAX_STATEMENT_LEN {
            return Err(TemplateError::StatementTooLong {
                len,
                max: MAX_STATEMENT_LEN,
            });
        }

        let sql = render_sql(&segments, len);
        Ok(Template {
            segments,
            kinds,
            sql,
        })
    }

    /// Bind `args` to the placeholders, in order.
    ///
    /// # Errors
    /// Returns `TemplateError::ArgumentCount` or `TemplateError::ArgumentKind` when the
    /// arguments do not line up with the placeholders.
    pub fn compile(&self, args: &[SqlArg<'_>]) -> Result<CompiledStatement, TemplateError> {
        if args.len() != self.kinds.len() {
            return Err(TemplateError::ArgumentCount {
                expected: self.kinds.len(),
                supplied: args.len(),
            });
        }

        let params = self
            .kinds
            .iter()
            .zip(args)
            .enumerate()
            .map(|(idx, (kind, arg))| BoundParameter::bind(idx + 1, *kind, arg))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledStatement {
            sql: self.sql.clone(),
            params,
        })
    }

    /// Statement text with positional markers.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Placeholder kinds in marker order.
    #[must_use]
    pub fn kinds(&self) -> &[PlaceholderKind] {
        &self.kinds
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.kinds.len()
    }
}

fn render_sql(segments: &[Segment], capacity: usize) -> String {
    let mut sql = String::with_capacity(capacity);
    let mut index = 0;
    for segment in segments {
        match segment {
            Segment::Literal(text) => sql.push_str(text),
            Segment::Placeholder(_) => {
                index += 1;
                // writing into a String cannot fail
                let _ = write!(sql, "${index}");
            }
        }
    }
    sql
}

/// Rewritten statement text plus its bound parameters. Lives for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStatement {
    sql: String,
    params: Vec<BoundParameter>,
}

impl CompiledStatement {
    /// A statement with no placeholders, used for fixed utility statements.
    ///
    /// # Errors
    /// Returns `TemplateError` if `sql` contains directives or is too long.
    pub fn plain(sql: &str) -> Result<Self, TemplateError> {
        Template::parse(sql)?.compile(&[])
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[BoundParameter] {
        &self.params
    }
}

/// Parse and bind in one step.
///
/// # Errors
/// Returns any `TemplateError` from [`Template::parse`] or [`Template::compile`].
pub fn compile(template: &str, args: &[SqlArg<'_>]) -> Result<CompiledStatement, TemplateError> {
    Template::parse(template)?.compile(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_placeholders_in_order() {
        let stmt = compile(
            "INSERT INTO transaction_lines (transaction, debit_account, credit_account, amount, currency) \
             VALUES (LASTVAL(), %d, (SELECT id FROM accounts WHERE name = %s), %f, 'NOK')",
            &[SqlArg::Int(4), SqlArg::from("bob"), SqlArg::Float(12.5)],
        )
        .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO transaction_lines (transaction, debit_account, credit_account, amount, currency) \
             VALUES (LASTVAL(), $1, (SELECT id FROM accounts WHERE name = $2), $3, 'NOK')"
        );
        let texts: Vec<_> = stmt.params().iter().map(|p| p.as_text().unwrap()).collect();
        assert_eq!(texts, ["4", "bob", "12.500000"]);
    }

    #[test]
    fn repeated_values_get_separate_slots() {
        let cmd = "42";
        let stmt = compile(
            "SELECT name FROM accounts WHERE (id = %s::INTEGER OR name = %s) AND type = 'product'",
            &[SqlArg::from(cmd), SqlArg::from(cmd)],
        )
        .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT name FROM accounts WHERE (id = $1::INTEGER OR name = $2) AND type = 'product'"
        );
        assert_eq!(stmt.params().len(), 2);
    }

    #[test]
    fn double_percent_is_literal_and_consumes_nothing() {
        let template = Template::parse("SELECT '100%%' || %s, '%%%%'").unwrap();
        assert_eq!(template.sql(), "SELECT '100%' || $1, '%%'");
        assert_eq!(template.placeholder_count(), 1);
    }

    #[test]
    fn segments_round_trip_to_sql() {
        let template = Template::parse("a %s b %d%u c %zu").unwrap();
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("a ".into()),
                Segment::Placeholder(PlaceholderKind::Text),
                Segment::Literal(" b ".into()),
                Segment::Placeholder(PlaceholderKind::Int),
                Segment::Placeholder(PlaceholderKind::UInt),
                Segment::Literal(" c ".into()),
                Segment::Placeholder(PlaceholderKind::Size),
            ]
        );
        assert_eq!(template.sql(), "a $1 b $2$3 c $4");
    }

    #[test]
    fn tenth_placeholder_uses_two_digits() {
        let text = "%d,".repeat(10);
        let template = Template::parse(&text).unwrap();
        assert!(template.sql().ends_with("$9,$10,"));
    }

    #[test]
    fn eleven_placeholders_are_rejected() {
        let text = "%d,".repeat(11);
        assert_eq!(
            Template::parse(&text).unwrap_err(),
            TemplateError::TooManyPlaceholders { max: 10 }
        );
    }

    #[test]
    fn unknown_letters_are_rejected() {
        assert_eq!(
            Template::parse("SELECT %x").unwrap_err(),
            TemplateError::UnknownPlaceholder {
                position: 7,
                found: 'x'
            }
        );
        assert_eq!(
            Template::parse("SELECT 1 %").unwrap_err(),
            TemplateError::DanglingPercent { position: 9 }
        );
        assert_eq!(
            Template::parse("%zd").unwrap_err(),
            TemplateError::UnsupportedSizeModifier {
                position: 0,
                found: 'd'
            }
        );
        assert_eq!(
            Template::parse("%z").unwrap_err(),
            TemplateError::DanglingPercent { position: 0 }
        );
    }

    #[test]
    fn overlong_statement_is_rejected_not_truncated() {
        let exact = "x".repeat(MAX_STATEMENT_LEN);
        assert!(Template::parse(&exact).is_ok());

        let long = format!("{}%s", "x".repeat(MAX_STATEMENT_LEN - 1));
        assert_eq!(
            Template::parse(&long).unwrap_err(),
            TemplateError::StatementTooLong {
                len: MAX_STATEMENT_LEN + 1,
                max: MAX_STATEMENT_LEN
            }
        );
    }

    #[test]
    fn argument_count_must_match() {
        let template = Template::parse("SELECT %d, %d").unwrap();
        assert_eq!(
            template.compile(&[SqlArg::Int(1)]).unwrap_err(),
            TemplateError::ArgumentCount {
                expected: 2,
                supplied: 1
            }
        );
    }

    #[test]
    fn non_ascii_literals_survive() {
        let stmt = compile("SELECT 'Ærling Øgilsblå', %s", &[SqlArg::from("støtte")]).unwrap();
        assert_eq!(stmt.sql(), "SELECT 'Ærling Øgilsblå', $1");
        assert_eq!(stmt.params()[0].as_text(), Some("støtte"));
    }

    #[test]
    fn plain_statement_has_no_params() {
        let stmt = CompiledStatement::plain("BEGIN").unwrap();
        assert_eq!(stmt.sql(), "BEGIN");
        assert!(stmt.params().is_empty());
    }
}
