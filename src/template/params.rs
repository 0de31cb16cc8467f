use crate::error::TemplateError;
use crate::types::{PlaceholderKind, SqlArg};

/// Wire format of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamFormat {
    /// Server parses the bytes as the text form of the inferred type
    Text,
    /// Opaque bytes, no text encoding
    Binary,
}

/// The materialized value for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParameter {
    value: Option<Vec<u8>>,
    format: ParamFormat,
}

impl BoundParameter {
    /// Bind `arg` to the placeholder `$position` of the given kind.
    ///
    /// # Errors
    /// Returns `TemplateError::ArgumentKind` when the argument does not match the placeholder.
    pub fn bind(
        position: usize,
        expected: PlaceholderKind,
        arg: &SqlArg<'_>,
    ) -> Result<Self, TemplateError> {
        if arg.kind() != expected {
            return Err(TemplateError::ArgumentKind {
                position,
                expected,
                supplied: arg.kind(),
            });
        }

        let param = match *arg {
            SqlArg::Text(Some(s)) => Self::text(s.as_bytes().to_vec()),
            SqlArg::Text(None) => Self::null(),
            SqlArg::Int(v) => Self::text(v.to_string().into_bytes()),
            SqlArg::UInt(v) => Self::text(v.to_string().into_bytes()),
            SqlArg::Size(v) => Self::text(v.to_string().into_bytes()),
            SqlArg::BigInt(v) => Self::text(v.to_string().into_bytes()),
            SqlArg::Float(v) => Self::text(render_float(v).into_bytes()),
            SqlArg::Binary(bytes) => BoundParameter {
                value: Some(bytes.to_vec()),
                format: ParamFormat::Binary,
            },
        };
        Ok(param)
    }

    fn text(bytes: Vec<u8>) -> Self {
        BoundParameter {
            value: Some(bytes),
            format: ParamFormat::Text,
        }
    }

    fn null() -> Self {
        BoundParameter {
            value: None,
            format: ParamFormat::Text,
        }
    }

    /// Bytes sent to the server, `None` for SQL NULL.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    /// Byte length used for binding (0 for NULL).
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.as_ref().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    #[must_use]
    pub fn format(&self) -> ParamFormat {
        self.format
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.format == ParamFormat::Binary
    }

    /// Text form of the value, if it is a non-null text parameter.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self.format {
            ParamFormat::Text => self.bytes().and_then(|b| std::str::from_utf8(b).ok()),
            ParamFormat::Binary => None,
        }
    }
}

// Fixed notation with six fractional digits; non-finite values use the spellings
// PostgreSQL accepts for float8 input.
fn render_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        format!("{value:.6}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_bound_as_decimal_text() {
        let p = BoundParameter::bind(1, PlaceholderKind::Int, &SqlArg::Int(-42)).unwrap();
        assert_eq!(p.as_text(), Some("-42"));
        assert!(!p.is_binary());

        let p = BoundParameter::bind(1, PlaceholderKind::Size, &SqlArg::Size(usize::MAX)).unwrap();
        assert_eq!(p.as_text(), Some(usize::MAX.to_string().as_str()));

        let p = BoundParameter::bind(1, PlaceholderKind::BigInt, &SqlArg::BigInt(i64::MIN)).unwrap();
        assert_eq!(p.as_text(), Some("-9223372036854775808"));
    }

    #[test]
    fn floats_use_fixed_notation() {
        let p = BoundParameter::bind(1, PlaceholderKind::Float, &SqlArg::Float(35.0)).unwrap();
        assert_eq!(p.as_text(), Some("35.000000"));
        let p = BoundParameter::bind(1, PlaceholderKind::Float, &SqlArg::Float(1e-7)).unwrap();
        assert_eq!(p.as_text(), Some("0.000000"));
        let p = BoundParameter::bind(1, PlaceholderKind::Float, &SqlArg::Float(f64::NEG_INFINITY))
            .unwrap();
        assert_eq!(p.as_text(), Some("-Infinity"));
    }

    #[test]
    fn binary_keeps_embedded_zero_bytes() {
        let raw = [0_u8, 1, 0, 255, 0];
        let p = BoundParameter::bind(3, PlaceholderKind::Binary, &SqlArg::Binary(&raw)).unwrap();
        assert!(p.is_binary());
        assert_eq!(p.len(), 5);
        assert_eq!(p.bytes(), Some(&raw[..]));
        assert_eq!(p.as_text(), None);
    }

    #[test]
    fn null_text_binds_null() {
        let p = BoundParameter::bind(1, PlaceholderKind::Text, &SqlArg::Text(None)).unwrap();
        assert!(p.is_null());
        assert_eq!(p.len(), 0);
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let err = BoundParameter::bind(2, PlaceholderKind::Int, &SqlArg::from("7")).unwrap_err();
        assert_eq!(
            err,
            TemplateError::ArgumentKind {
                position: 2,
                expected: PlaceholderKind::Int,
                supplied: PlaceholderKind::Text,
            }
        );
    }
}
