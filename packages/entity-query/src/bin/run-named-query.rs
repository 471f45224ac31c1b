//! Named Query Runner
//!
//! Executes one named query from a YAML catalog against a SQLite database
//! and prints the result as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Keyed parameters, first page of 20
//! run-named-query --catalog queries.yaml --database app.db \
//!     --query User.findByStatus --param status=active --max-results 20
//!
//! # Positional parameters, update mode
//! run-named-query -c queries.yaml -d app.db -q User.rename \
//!     --positional '"bob"' --positional 42 --mode update
//! ```
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=entity_query=debug`).
//!
//! Built with the `cli` feature (on by default). Library users can depend on
//! `default-features = false, features = ["sqlite"]` to skip the CLI crates.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use entity_query::{EntityRepository, QueryCatalog, SqliteEntityRepository};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "run-named-query")]
#[command(about = "Execute a named query from a YAML catalog against SQLite", long_about = None)]
struct Cli {
    /// Query catalog (YAML, version 1)
    #[arg(short, long)]
    catalog: PathBuf,

    /// SQLite database file
    #[arg(short, long)]
    database: PathBuf,

    /// Query name as registered in the catalog
    #[arg(short, long)]
    query: String,

    /// Keyed parameter `name=value`; value is parsed as JSON, else taken as text
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Positional parameter, in order; value is parsed as JSON, else taken as text
    #[arg(long, value_name = "VALUE", conflicts_with = "params")]
    positional: Vec<String>,

    /// Offset of the first row
    #[arg(long, allow_negative_numbers = true)]
    first_result: Option<i64>,

    /// Maximum number of rows
    #[arg(long, allow_negative_numbers = true)]
    max_results: Option<i64>,

    /// Execution mode
    #[arg(short, long, value_enum, default_value = "list")]
    mode: Mode,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum Mode {
    List,
    Single,
    Update,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let catalog = QueryCatalog::from_yaml_file(&cli.catalog)
        .with_context(|| format!("loading catalog {}", cli.catalog.display()))?;
    let repository = SqliteEntityRepository::open(&cli.database, catalog)
        .with_context(|| format!("opening database {}", cli.database.display()))?;

    let mut query = repository.create_named_query(cli.query.as_str())?;
    if !cli.positional.is_empty() {
        let values: Vec<Value> = cli.positional.iter().map(|raw| parse_value(raw)).collect();
        query.set_parameters(values);
    }
    for raw in &cli.params {
        let (name, value) = parse_param(raw)?;
        query.add_parameter(name, value);
    }
    if let Some(first_result) = cli.first_result {
        query.set_first_result(first_result)?;
    }
    if let Some(max_results) = cli.max_results {
        query.set_max_results(max_results)?;
    }

    let output = match cli.mode {
        Mode::List => Value::Array(query.list::<Value>()?),
        Mode::Single => query.single_result::<Value>()?.unwrap_or(Value::Null),
        Mode::Update => serde_json::json!({ "affected": query.execute_update()? }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// JSON if it parses, otherwise plain text
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_param(raw: &str) -> Result<(&str, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("parameter '{}' is not of the form NAME=VALUE", raw))?;
    if name.trim().is_empty() {
        return Err(anyhow!("parameter '{}' has an empty name", raw));
    }
    Ok((name.trim(), parse_value(value)))
}
