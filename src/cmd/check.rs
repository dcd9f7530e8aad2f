//! Check command - report whether deleting from a table cascades cleanly.

use cascade_check::cascade::{search, to_json, to_text};
use cascade_check::schema::RelationGraph;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

pub fn run(
    file: PathBuf,
    table: String,
    source: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let (table, records) = super::load_schema(&file, &table, source, json)?;

    let graph = RelationGraph::build(&records, &table);
    let report = search(&graph, graph.root());

    tracing::info!(
        tables = graph.len(),
        safe = report.is_safe(),
        elapsed = ?start_time.elapsed(),
        "cascade check finished"
    );

    let mut stdout = std::io::stdout();
    if json {
        writeln!(stdout, "{}", to_json(&table, &report))?;
    } else {
        write!(stdout, "{}", to_text(&table, &report))?;
    }
    stdout.flush()?;

    if !report.is_safe() {
        std::process::exit(1);
    }

    Ok(())
}
