use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ledger_sql::config::{DATABASE_URL_ENV, DEFAULT_IDENTITY_SETTING};
use ledger_sql::{ConnectionConfig, PlaceholderKind, SessionOptions, SqlArg};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one templated statement against the ledger database")]
pub(crate) struct Args {
    /// libpq conninfo string or postgresql:// URL
    #[arg(long, env = DATABASE_URL_ENV, default_value = "dbname=p2k12 user=p2k12", hide_env_values = true)]
    pub(crate) conninfo: String,
    /// Acting identity applied to the session before the statement runs
    #[arg(long)]
    pub(crate) identity: Option<String>,
    #[arg(long, value_parser = humantime::parse_duration, default_value = "1s")]
    pub(crate) reconnect_delay: Duration,
    /// Give up after this many reconnect attempts instead of waiting forever
    #[arg(long)]
    pub(crate) max_reconnect_attempts: Option<u32>,
    #[arg(long, default_value = DEFAULT_IDENTITY_SETTING)]
    pub(crate) identity_setting: String,
    /// Also write log output to this file
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
    #[arg(short, long)]
    pub(crate) verbose: bool,
    /// Statement template, e.g. "SELECT * FROM accounts WHERE name = %s"
    pub(crate) template: String,
    /// One value per placeholder; `\N` binds NULL for %s
    pub(crate) values: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct QueryConfig {
    #[serde(flatten)]
    pub(crate) connection: ConnectionConfig,
    pub(crate) identity: Option<String>,
    pub(crate) template: String,
    pub(crate) values: Vec<String>,
    pub(crate) log: Option<PathBuf>,
    pub(crate) verbose: bool,
}

impl QueryConfig {
    pub(crate) fn from_args(args: Args) -> Self {
        let session = SessionOptions::default()
            .with_reconnect_delay(args.reconnect_delay)
            .with_max_reconnect_attempts(args.max_reconnect_attempts)
            .with_identity_setting(args.identity_setting);
        QueryConfig {
            connection: ConnectionConfig::new(args.conninfo).with_session(session),
            identity: args.identity,
            template: args.template,
            values: args.values,
            log: args.log,
            verbose: args.verbose,
        }
    }
}

/// A command-line value parsed for the placeholder it fills.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedValue {
    Text(Option<String>),
    Int(i32),
    UInt(u32),
    Size(usize),
    BigInt(i64),
    Float(f64),
    Binary(Vec<u8>),
}

impl ParsedValue {
    pub(crate) fn parse(kind: PlaceholderKind, raw: &str) -> Result<Self, String> {
        let invalid = |e: &dyn std::fmt::Display| format!("'{raw}' is not a valid {kind} value: {e}");
        Ok(match kind {
            PlaceholderKind::Text if raw == "\\N" => ParsedValue::Text(None),
            PlaceholderKind::Text => ParsedValue::Text(Some(raw.to_string())),
            PlaceholderKind::Int => ParsedValue::Int(raw.parse().map_err(|e| invalid(&e))?),
            PlaceholderKind::UInt => ParsedValue::UInt(raw.parse().map_err(|e| invalid(&e))?),
            PlaceholderKind::Size => ParsedValue::Size(raw.parse().map_err(|e| invalid(&e))?),
            PlaceholderKind::BigInt => ParsedValue::BigInt(raw.parse().map_err(|e| invalid(&e))?),
            PlaceholderKind::Float => ParsedValue::Float(raw.parse().map_err(|e| invalid(&e))?),
            PlaceholderKind::Binary => ParsedValue::Binary(raw.as_bytes().to_vec()),
        })
    }

    pub(crate) fn as_arg(&self) -> SqlArg<'_> {
        match self {
            ParsedValue::Text(v) => SqlArg::Text(v.as_deref()),
            ParsedValue::Int(v) => SqlArg::Int(*v),
            ParsedValue::UInt(v) => SqlArg::UInt(*v),
            ParsedValue::Size(v) => SqlArg::Size(*v),
            ParsedValue::BigInt(v) => SqlArg::BigInt(*v),
            ParsedValue::Float(v) => SqlArg::Float(*v),
            ParsedValue::Binary(v) => SqlArg::Binary(v),
        }
    }
}
