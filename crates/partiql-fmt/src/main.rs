//! partiql-fmt CLI
//!
//! Parses one query and prints it in canonical form.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use partiql_parser::ast::codec;
use partiql_parser::parser::clock;
use partiql_parser::Query;

/// Validate and pretty-print PartiQL queries.
#[derive(Parser)]
#[command(name = "partiql-fmt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Query text. Read from --file or stdin if omitted.
    query: Option<String>,

    /// Read the query from a file.
    #[arg(short, long, conflicts_with = "query")]
    file: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Only validate; print nothing on success.
    #[arg(long)]
    check: bool,

    /// Pin the value of UTCNOW() (RFC 3339).
    #[arg(long, env = "PARTIQL_FMT_NOW", value_parser = parse_now)]
    now: Option<DateTime<Utc>>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Canonical query text.
    Text,
    /// The AST as pretty-printed JSON.
    Json,
    /// Hex of the binary encoding.
    Hex,
}

fn parse_now(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|ts| ts.with_timezone(&Utc))
}

fn read_input(cli: &Cli) -> anyhow::Result<Vec<u8>> {
    if let Some(query) = &cli.query {
        return Ok(query.clone().into_bytes());
    }
    if let Some(path) = &cli.file {
        return std::fs::read(path).with_context(|| format!("reading {}", path.display()));
    }
    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("reading stdin")?;
    Ok(input)
}

fn render(query: &Query, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Text => Ok(query.to_string()),
        Format::Json => serde_json::to_string_pretty(query).context("serializing to JSON"),
        Format::Hex => {
            let bytes = codec::encode(query).context("encoding query")?;
            Ok(hex::encode(bytes))
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(now) = cli.now {
        debug!(%now, "pinning UTCNOW()");
        clock::set_fake_now(Some(now));
    }

    let input = read_input(&cli)?;
    let query = match partiql_parser::parse(&input) {
        Ok(query) => query,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if !cli.check {
        println!("{}", render(&query, cli.format)?);
    }
    Ok(ExitCode::SUCCESS)
}
