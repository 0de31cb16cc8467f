mod args;
mod render;

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ledger_sql::{LedgerDbError, PgSession, Session, SqlArg, Template};
use tracing::{Level, error, info};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

use crate::args::{Args, ParsedValue, QueryConfig};

/// Log to stderr, and also to `path` when given.
fn log_writer(path: Option<&Path>) -> io::Result<BoxMakeWriter> {
    Ok(match path {
        Some(path) => {
            let file = Arc::new(File::create(path)?);
            BoxMakeWriter::new(io::stderr.and(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    })
}

fn run(config: &QueryConfig) -> Result<(), LedgerDbError> {
    let template = Template::parse(&config.template)?;
    let values = template
        .kinds()
        .iter()
        .zip(&config.values)
        .map(|(kind, raw)| ParsedValue::parse(*kind, raw))
        .collect::<Result<Vec<_>, _>>()
        .map_err(LedgerDbError::ConfigError)?;
    if values.len() != config.values.len() || values.len() != template.placeholder_count() {
        return Err(LedgerDbError::ConfigError(format!(
            "template expects {} values, got {}",
            template.placeholder_count(),
            config.values.len()
        )));
    }
    let args: Vec<SqlArg<'_>> = values.iter().map(ParsedValue::as_arg).collect();

    let mut session: PgSession = Session::connect(&config.connection)?;
    if let Some(identity) = config.identity.as_deref() {
        session.set_identity(Some(identity))?;
    }
    session.execute_template(&template, &args)?;

    if let Some(result) = session.result() {
        print!("{}", render::render(result));
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = QueryConfig::from_args(args);
    let writer = match log_writer(config.log.as_deref()) {
        Ok(writer) => writer,
        Err(err) => {
            eprintln!("failed to open log file: {err}");
            return ExitCode::FAILURE;
        }
    };

    let level = if config.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(false)
        .with_max_level(level)
        .init();

    let config_json =
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "{}".to_string());
    info!("config: {}", config_json);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_fatal() => {
            error!(error = %err, "session identity could not be applied; refusing to continue");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(error = %err, "statement failed");
            ExitCode::FAILURE
        }
    }
}
