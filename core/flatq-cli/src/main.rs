//! flatq: interactive SQL prompt over a directory of CSV tables

use clap::Parser;
use flatq_core::engine::StatementKind;
use flatq_core::{Database, EngineConfig, FlatqResult, StatementOutcome};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

const PROMPT: &str = "SQL> ";

#[derive(Parser, Debug)]
#[command(name = "flatq")]
#[command(version)]
#[command(about = "Run SELECT / INSERT / DELETE against CSV files")]
#[command(long_about = "flatq command-line interface

Every <table> in a statement maps to <data-dir>/<table>.csv.

USAGE MODES:
  Interactive prompt:  flatq --data-dir ./data
  Single statement:    flatq --data-dir ./data -c \"SELECT * FROM users\"

Type `exit` at the prompt to quit.")]
struct Cli {
    /// Directory holding the <table>.csv files (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// JSON engine config file; FLATQ_* environment variables are used otherwise
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level written to stderr (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", env = "FLATQ_LOG", default_value = "warn")]
    log_level: String,

    /// Execute one statement and exit
    #[arg(short = 'c', long, value_name = "SQL")]
    command: Option<String>,
}

impl Cli {
    fn engine_config(&self) -> FlatqResult<EngineConfig> {
        let config = match &self.config {
            Some(path) => EngineConfig::load_from_file(path)?,
            None => EngineConfig::from_env()?,
        };
        Ok(match &self.data_dir {
            Some(dir) => config.with_data_dir(dir),
            None => config,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    flatq_core::logging::init_with_level(&cli.log_level);

    let db = match cli.engine_config().and_then(Database::open_with_config) {
        Ok(db) => db,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(sql) = &cli.command {
        return match render(&db, sql) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::FAILURE
            }
        };
    }

    match repl(&db, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Read statements line by line until EOF or `exit`.
fn repl(db: &Database, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
    writeln!(
        out,
        "flatq SQL prompt. Enter SQL statements, or type \"exit\" to quit."
    )?;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let sql = line.trim();
        if sql.eq_ignore_ascii_case("exit") {
            break;
        }
        if !sql.is_empty() {
            match render(db, sql) {
                Ok(text) => writeln!(out, "{text}")?,
                Err(err) => eprintln!("Error: {err}"),
            }
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }

    writeln!(out, "\nExiting flatq")?;
    Ok(())
}

/// Execute one statement and format what the prompt prints for it.
///
/// Statements other than SELECT / INSERT / DELETE are not errors here; they
/// produce an `Unsupported command` line.
fn render(db: &Database, sql: &str) -> FlatqResult<String> {
    if StatementKind::detect(sql).is_none() {
        let command = sql.split_whitespace().next().unwrap_or_default();
        return Ok(format!("Unsupported command: {}", command.to_uppercase()));
    }

    debug!(sql, "executing statement");
    match db.execute(sql)? {
        StatementOutcome::Rows(rows) => Ok(format!(
            "Query Result:\n{}",
            serde_json::to_string_pretty(&rows)?
        )),
        StatementOutcome::Ack(ack) => Ok(ack.message),
    }
}
