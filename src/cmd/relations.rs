//! Relations command - list the foreign-key graph connected to a table.

use cascade_check::schema::{RelationGraph, TableRole};
use serde::Serialize;
use std::path::PathBuf;

/// JSON representation of the connected relation graph
#[derive(Debug, Serialize)]
struct RelationsJson<'a> {
    table: &'a str,
    tables: Vec<TableJson<'a>>,
}

#[derive(Debug, Serialize)]
struct TableJson<'a> {
    name: &'a str,
    relations: Vec<RelationJson<'a>>,
}

#[derive(Debug, Serialize)]
struct RelationJson<'a> {
    role: TableRole,
    table: &'a str,
    cascades: bool,
}

pub fn run(
    file: PathBuf,
    table: String,
    source: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (table, records) = super::load_schema(&file, &table, source, json)?;
    let graph = RelationGraph::build(&records, &table);

    if json {
        let output = build_relations_json(&table, &graph);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Relation graph for '{}' ({} tables):", table, graph.len());
    for (_, node) in graph.iter() {
        println!("{}", node.name);
        for relation in &node.relations {
            let other = graph.table_name(relation.table).unwrap_or("?");
            let role = match relation.owner {
                TableRole::Parent => "parent of",
                TableRole::Child => "child of",
            };
            let action = if relation.cascades {
                "cascade"
            } else {
                "no cascade"
            };
            println!("  {} {} [{}]", role, other, action);
        }
    }

    Ok(())
}

fn build_relations_json<'a>(table: &'a str, graph: &'a RelationGraph) -> RelationsJson<'a> {
    let tables = graph
        .iter()
        .map(|(_, node)| TableJson {
            name: node.name.as_str(),
            relations: node
                .relations
                .iter()
                .map(|r| RelationJson {
                    role: r.owner,
                    table: graph.table_name(r.table).unwrap_or_default(),
                    cascades: r.cascades,
                })
                .collect(),
        })
        .collect();

    RelationsJson { table, tables }
}
