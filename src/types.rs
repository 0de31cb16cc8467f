use std::fmt;

/// The kind of value a template placeholder binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// `%s`
    Text,
    /// `%d`
    Int,
    /// `%u`
    UInt,
    /// `%zu`
    Size,
    /// `%l`
    BigInt,
    /// `%f`
    Float,
    /// `%B`
    Binary,
}

impl PlaceholderKind {
    /// Map a type letter (the character after `%`) to its kind. `z` is handled by the scanner.
    #[must_use]
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b's' => Some(Self::Text),
            b'd' => Some(Self::Int),
            b'u' => Some(Self::UInt),
            b'l' => Some(Self::BigInt),
            b'f' => Some(Self::Float),
            b'B' => Some(Self::Binary),
            _ => None,
        }
    }

    /// The directive as written in a template, e.g. `%zu`.
    #[must_use]
    pub fn directive(self) -> &'static str {
        match self {
            Self::Text => "%s",
            Self::Int => "%d",
            Self::UInt => "%u",
            Self::Size => "%zu",
            Self::BigInt => "%l",
            Self::Float => "%f",
            Self::Binary => "%B",
        }
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive())
    }
}

/// One caller-supplied argument for a template placeholder.
///
/// Arguments are tagged at the call site so a placeholder/argument mismatch is
/// caught before anything reaches the database:
/// ```rust
/// use ledger_sql::prelude::*;
///
/// let account = 17_i32;
/// let args = [SqlArg::from(account), SqlArg::from("coffee"), SqlArg::from(12.5_f64)];
/// let stmt = compile("SELECT buy(%d, %s, %f)", &args).unwrap();
/// assert_eq!(stmt.sql(), "SELECT buy($1, $2, $3)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SqlArg<'a> {
    /// Text value; `None` binds SQL NULL
    Text(Option<&'a str>),
    /// Signed 32-bit integer
    Int(i32),
    /// Unsigned 32-bit integer
    UInt(u32),
    /// Platform-width unsigned integer
    Size(usize),
    /// Signed 64-bit integer
    BigInt(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Raw bytes, bound in binary format
    Binary(&'a [u8]),
}

impl SqlArg<'_> {
    /// The placeholder kind this argument satisfies.
    #[must_use]
    pub fn kind(&self) -> PlaceholderKind {
        match self {
            SqlArg::Text(_) => PlaceholderKind::Text,
            SqlArg::Int(_) => PlaceholderKind::Int,
            SqlArg::UInt(_) => PlaceholderKind::UInt,
            SqlArg::Size(_) => PlaceholderKind::Size,
            SqlArg::BigInt(_) => PlaceholderKind::BigInt,
            SqlArg::Float(_) => PlaceholderKind::Float,
            SqlArg::Binary(_) => PlaceholderKind::Binary,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlArg::Text(None))
    }
}

impl<'a> From<&'a str> for SqlArg<'a> {
    fn from(value: &'a str) -> Self {
        SqlArg::Text(Some(value))
    }
}

impl<'a> From<&'a String> for SqlArg<'a> {
    fn from(value: &'a String) -> Self {
        SqlArg::Text(Some(value.as_str()))
    }
}

impl<'a> From<Option<&'a str>> for SqlArg<'a> {
    fn from(value: Option<&'a str>) -> Self {
        SqlArg::Text(value)
    }
}

impl From<i32> for SqlArg<'_> {
    fn from(value: i32) -> Self {
        SqlArg::Int(value)
    }
}

impl From<u32> for SqlArg<'_> {
    fn from(value: u32) -> Self {
        SqlArg::UInt(value)
    }
}

impl From<usize> for SqlArg<'_> {
    fn from(value: usize) -> Self {
        SqlArg::Size(value)
    }
}

impl From<i64> for SqlArg<'_> {
    fn from(value: i64) -> Self {
        SqlArg::BigInt(value)
    }
}

impl From<f64> for SqlArg<'_> {
    fn from(value: f64) -> Self {
        SqlArg::Float(value)
    }
}

impl From<f32> for SqlArg<'_> {
    fn from(value: f32) -> Self {
        SqlArg::Float(f64::from(value))
    }
}

impl<'a> From<&'a [u8]> for SqlArg<'a> {
    fn from(value: &'a [u8]) -> Self {
        SqlArg::Binary(value)
    }
}

impl<'a> From<&'a Vec<u8>> for SqlArg<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        SqlArg::Binary(value.as_slice())
    }
}

/// Connection lifecycle as seen by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection has been opened yet
    #[default]
    Disconnected,
    /// Statements may be submitted
    Connected,
    /// The transport is unusable; only the reconnect loop runs in this state
    Fatal,
}
