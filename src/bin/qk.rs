//! Binary entry point for the qk CLI.
//!
//! Parses one query string and prints the resulting filters, sort,
//! pagination and field projection as JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Filters and sort from a query string
//! qk 'count.gte=1&count.lt=10&order_by=created_at.desc'
//!
//! # With renames and defaults from a config file
//! qk --config query.json 'names.all=foo|bar'
//!
//! # Debug logging for $or collapsing and distribution
//! qk --log-level debug 'or=[{"tags.in":["a"]}]&tags.in=b'
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use querykit::cli::{load_config, run_query, Overrides};
use querykit::error::QueryError;
use querykit::output::{emit_response, emit_response_compact, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Turn request parameters into document-database filters and sort clauses.
#[derive(Parser, Debug)]
#[command(name = "qk", version, about)]
struct Cli {
    /// Query string to parse (`a=1&b.gte=2`, leading `?` optional).
    query: String,

    /// JSON config file with defaults, renames and options.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Convert date-shaped strings inside `or` payloads to timestamps.
    #[arg(long)]
    parse_json_times: bool,

    /// Render sort directions as 1 / -1.
    #[arg(long)]
    numeric_sort: bool,

    /// Log level (overridden by RUST_LOG).
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log line format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level, cli.log_format);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.error_code();
            let _ = emit(&ErrorResponse::from(&err), cli.pretty);
            ExitCode::from(code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(cli: &Cli) -> Result<(), QueryError> {
    let overrides = Overrides {
        parse_json_times: cli.parse_json_times,
        numeric_sort: cli.numeric_sort,
    };
    let config = load_config(cli.config.as_deref(), overrides)?;
    let options = run_query(&cli.query, config)?;
    emit(&options, cli.pretty).map_err(|e| QueryError::internal(format!("failed to write output: {e}")))
}

/// Write a response to stdout.
fn emit<T: serde::Serialize>(response: &T, pretty: bool) -> io::Result<()> {
    let mut stdout = io::stdout();
    if pretty {
        emit_response(response, &mut stdout)?;
    } else {
        emit_response_compact(response, &mut stdout)?;
    }
    stdout.flush()
}
