//! Cascade reachability search.
//!
//! Walks a built [`RelationGraph`] from a table, following only relations in
//! which another table depends on the current one, and reports the first
//! dependency whose ON DELETE action is not CASCADE together with the chain
//! of tables leading to it.

mod report;

pub use report::{to_json, to_text, CascadeJson};

use crate::schema::{RelationGraph, RelationRecord, TableId, TableRole};
use serde::Serialize;
use tracing::{debug, trace};

/// The foreign key that would reject a cascading delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingRelation {
    /// Referenced table, reached through cascading deletes
    pub parent_table: String,
    /// Referencing table whose foreign key does not cascade
    pub child_table: String,
}

/// Outcome of a cascade search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeReport {
    /// Every dependent row is removed by cascading deletes
    Safe,
    /// Some dependent row would block the delete
    Unsafe {
        blocking: BlockingRelation,
        /// Table names from the searched table down to the blocked child
        chain: Vec<String>,
    },
}

impl CascadeReport {
    pub fn is_safe(&self) -> bool {
        matches!(self, CascadeReport::Safe)
    }

    pub fn blocking(&self) -> Option<&BlockingRelation> {
        match self {
            CascadeReport::Safe => None,
            CascadeReport::Unsafe { blocking, .. } => Some(blocking),
        }
    }

    /// Witness chain; empty when safe
    pub fn chain(&self) -> &[String] {
        match self {
            CascadeReport::Safe => &[],
            CascadeReport::Unsafe { chain, .. } => chain,
        }
    }
}

/// Search the graph for a dependency of `root` that does not cascade.
///
/// Only the first such relation in discovery order is reported. The visited
/// set belongs to this call, so searches over one graph never interfere.
pub fn search(graph: &RelationGraph, root: TableId) -> CascadeReport {
    let mut visited = vec![false; graph.len()];

    match find_witness(graph, root, &mut visited) {
        Some(witness) => {
            debug!(
                parent = %witness.blocking.parent_table,
                child = %witness.blocking.child_table,
                depth = witness.chain.len(),
                "found non-cascading relation"
            );
            CascadeReport::Unsafe {
                blocking: witness.blocking,
                chain: witness.chain,
            }
        }
        None => {
            debug!(
                visited = visited.iter().filter(|v| **v).count(),
                "all dependents cascade"
            );
            CascadeReport::Safe
        }
    }
}

/// Build the relation graph for `table` and search it
pub fn analyze(records: &[RelationRecord], table: &str) -> CascadeReport {
    let graph = RelationGraph::build(records, table);
    search(&graph, graph.root())
}

struct Witness {
    blocking: BlockingRelation,
    chain: Vec<String>,
}

fn mark_visited(visited: &mut [bool], id: TableId) {
    if let Some(seen) = visited.get_mut(id.0 as usize) {
        *seen = true;
    }
}

/// Depth-first walk with an explicit stack of (table, next relation index).
///
/// The stack always holds the path from the root to the current table, so the
/// chain is read straight off it when a non-cascading relation turns up.
fn find_witness(graph: &RelationGraph, root: TableId, visited: &mut [bool]) -> Option<Witness> {
    graph.table(root)?;
    mark_visited(visited, root);

    let mut stack: Vec<(TableId, usize)> = vec![(root, 0)];

    while let Some(frame) = stack.last_mut() {
        let (id, next) = *frame;
        let Some(table) = graph.table(id) else {
            stack.pop();
            continue;
        };
        let Some(relation) = table.relations.get(next) else {
            stack.pop();
            continue;
        };
        frame.1 += 1;

        if next == 0 {
            trace!(table = %table.name, "visiting");
        }
        if relation.owner != TableRole::Parent {
            continue;
        }

        let child = graph.table_name(relation.table).unwrap_or_default();

        if !relation.cascades {
            let mut chain: Vec<String> = stack
                .iter()
                .filter_map(|(id, _)| graph.table_name(*id))
                .map(str::to_string)
                .collect();
            chain.push(child.to_string());
            return Some(Witness {
                blocking: BlockingRelation {
                    parent_table: table.name.clone(),
                    child_table: child.to_string(),
                },
                chain,
            });
        }

        let seen = visited
            .get(relation.table.0 as usize)
            .copied()
            .unwrap_or(true);
        if !seen {
            mark_visited(visited, relation.table);
            stack.push((relation.table, 0));
        }
    }

    None
}
