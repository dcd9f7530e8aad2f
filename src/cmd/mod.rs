mod check;
mod relations;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cascade-check")]
#[command(version)]
#[command(
    about = "Check whether deleting from a table cascades through every foreign-key dependent",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that deleting a row from TABLE cascades to every dependent row
    Check {
        /// SQLite database file or SQL schema dump (supports .gz, .bz2, .xz, .zst)
        file: PathBuf,

        /// Table to analyze
        table: String,

        /// Schema source: auto, sqlite, sql (auto-detected if not specified)
        #[arg(short, long)]
        source: Option<String>,

        /// Output the result as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Show the foreign-key relations connected to TABLE
    Relations {
        /// SQLite database file or SQL schema dump (supports .gz, .bz2, .xz, .zst)
        file: PathBuf,

        /// Table whose connected relations are listed
        table: String,

        /// Schema source: auto, sqlite, sql (auto-detected if not specified)
        #[arg(short, long)]
        source: Option<String>,

        /// Output the relations as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Check {
            file,
            table,
            source,
            json,
        } => check::run(file, table, source, json),
        Commands::Relations {
            file,
            table,
            source,
            json,
        } => relations::run(file, table, source, json),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "cascade-check",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

/// Open the schema source and load every foreign key, resolving `table` to its declared name.
fn load_schema(
    file: &std::path::Path,
    table: &str,
    source: Option<String>,
    quiet: bool,
) -> anyhow::Result<(String, Vec<cascade_check::schema::RelationRecord>)> {
    use cascade_check::source::{RelationSource, SourceKind};

    let kind: SourceKind = match source {
        Some(s) => s.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => SourceKind::Auto,
    };

    let source = RelationSource::open(file, kind)?;
    if !quiet {
        eprintln!(
            "Reading schema: {} [source: {}]",
            file.display(),
            source.kind()
        );
    }

    let table = source.resolve_table(table)?;
    let records = source.relation_records()?;
    tracing::info!(table = %table, foreign_keys = records.len(), "loaded schema");

    Ok((table, records))
}
