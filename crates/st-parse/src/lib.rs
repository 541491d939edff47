//! Command-line front end for `st-syntax`.
//!
//! Parses Structured Text files in parallel and prints tokens, trees, errors
//! or a JSON report. The binary in `main.rs` only sets up logging and calls
//! [`run`].

pub mod config;
pub mod files;
pub mod output;
pub mod worker;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use crate::config::{Config, Format};

#[derive(Debug, Parser)]
#[command(
    name = "st-parse",
    version,
    about = "Parse IEC 61131-3 Structured Text files",
    after_help = "Examples:\n  st-parse src/\n  st-parse --format tree main.st\n  st-parse --format json 'lib/**/*.st'\n  st-parse --grammar > grammar.json"
)]
pub struct Args {
    /// Configuration file (defaults to ./st-parse.toml when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<Format>,
    /// Worker threads.
    #[arg(long, short)]
    pub jobs: Option<usize>,
    /// Include whitespace and comments in token and tree output.
    #[arg(long)]
    pub show_trivia: bool,
    /// Print the grammar as grammar.json.
    #[arg(long)]
    pub grammar: bool,
    /// Validate the grammar table.
    #[arg(long)]
    pub check_grammar: bool,
    /// Files, directories or glob patterns.
    #[arg(value_name = "PATHS")]
    pub paths: Vec<String>,
}

/// Totals of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    /// Files that had parse errors or could not be read.
    pub failed: usize,
    pub grammar_invalid: bool,
}

impl Summary {
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed == 0 && !self.grammar_invalid
    }
}

/// Executes one invocation, writing rendered output to `out`.
pub fn run(args: &Args, out: &mut impl Write) -> anyhow::Result<Summary> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&std::env::current_dir()?)?,
    };
    let format = args.format.unwrap_or(config.output.format);
    let show_trivia = args.show_trivia || config.output.show_trivia;
    let jobs = args.jobs.map_or_else(|| config.jobs(), |jobs| jobs.max(1));

    let mut summary = Summary::default();

    if args.check_grammar {
        match st_syntax::grammar().validate() {
            Ok(()) => info!("grammar table is valid"),
            Err(err) => {
                error!(%err, "grammar table is invalid");
                summary.grammar_invalid = true;
            }
        }
    }
    if args.grammar {
        let json = st_syntax::grammar()
            .to_json_string()
            .context("serializing grammar")?;
        writeln!(out, "{json}")?;
    }
    if args.paths.is_empty() {
        if args.grammar || args.check_grammar {
            return Ok(summary);
        }
        anyhow::bail!("no input paths given");
    }

    let paths = files::collect_files(&args.paths, &config.parse.extensions)?;
    info!(files = paths.len(), jobs, ?format, "parsing");
    summary.files = paths.len();

    for outcome in worker::parse_files(paths, jobs) {
        match outcome {
            Ok(report) => {
                if !report.ok() {
                    summary.failed += 1;
                }
                out.write_all(output::render(&report, format, show_trivia).as_bytes())?;
            }
            Err(failure) => {
                error!(path = %failure.path.display(), error = %failure.error, "cannot read file");
                summary.failed += 1;
            }
        }
    }
    info!(files = summary.files, failed = summary.failed, "done");
    Ok(summary)
}
