//! Relation graph for cascade analysis.
//!
//! Provides:
//! - Construction of the connected component around a start table
//! - Per-table relation lists in both directions (referenced and referencing)
//! - Termination on cyclic schemas, including self-referencing tables

use super::{RelationRecord, Table, TableId, TableRegistry, TableRelation, TableRole};
use tracing::{debug, trace};

/// Relation graph built from foreign-key records around one start table.
///
/// Every table reachable from the start table by following foreign keys in
/// either direction is present, each with the complete list of relations it
/// takes part in. The graph is immutable once built, so any number of
/// searches may borrow it.
#[derive(Debug)]
pub struct RelationGraph {
    /// Table nodes, one per name
    registry: TableRegistry,
    /// The table the graph was built for
    root: TableId,
}

impl RelationGraph {
    /// Build the connected relation graph containing `start`.
    ///
    /// `records` must list every foreign key of the schema; filtering to the
    /// reachable component happens here. A start table that appears in no
    /// record becomes a single table without relations.
    pub fn build(records: &[RelationRecord], start: &str) -> Self {
        let mut registry = TableRegistry::new();
        let root = registry.get_or_create(start);

        // Worklist instead of recursion: deep schemas must not grow the stack.
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            collect_table(&mut registry, records, id, &mut pending);
        }

        debug!(
            table = start,
            tables = registry.len(),
            records = records.len(),
            "built relation graph"
        );

        Self { registry, root }
    }

    /// Handle of the table the graph was built for
    pub fn root(&self) -> TableId {
        self.root
    }

    /// Get table by ID
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.registry.table(id)
    }

    /// Get the table name for a table ID
    pub fn table_name(&self, id: TableId) -> Option<&str> {
        self.registry.name(id)
    }

    /// Get table ID by exact name
    pub fn get_table_id(&self, name: &str) -> Option<TableId> {
        self.registry.get(name)
    }

    /// Relations of a table in discovery order (empty for unknown IDs)
    pub fn relations(&self, id: TableId) -> &[TableRelation] {
        self.table(id)
            .map(|t| t.relations.as_slice())
            .unwrap_or_default()
    }

    /// Whether the builder finished appending relations for this table
    pub fn is_collected(&self, id: TableId) -> bool {
        self.table(id).map(|t| t.collected).unwrap_or(false)
    }

    /// Get the number of tables in the graph
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Iterate over tables in the order they were discovered
    pub fn iter(&self) -> impl Iterator<Item = (TableId, &Table)> {
        self.registry.iter()
    }
}

/// Append the relations of one table and schedule every related table.
///
/// The `collected` marker is set before any relation is appended; it is what
/// stops self-references and cycles from being processed twice.
fn collect_table(
    registry: &mut TableRegistry,
    records: &[RelationRecord],
    id: TableId,
    pending: &mut Vec<TableId>,
) {
    let name = match registry.table_mut(id) {
        Some(table) if !table.collected => {
            table.collected = true;
            table.name.clone()
        }
        _ => return,
    };

    let mut added = Vec::new();
    for record in records {
        if record.child_table == name {
            let parent = registry.get_or_create(&record.parent_table);
            added.push(TableRelation {
                owner: TableRole::Child,
                table: parent,
                cascades: record.on_delete.cascades(),
            });
        }
        if record.parent_table == name {
            let child = registry.get_or_create(&record.child_table);
            added.push(TableRelation {
                owner: TableRole::Parent,
                table: child,
                cascades: record.on_delete.cascades(),
            });
        }
    }

    trace!(table = %name, relations = added.len(), "collected table");

    // Reversed so the first-discovered neighbour is processed next.
    for relation in added.iter().rev() {
        let done = registry
            .table(relation.table)
            .map(|t| t.collected)
            .unwrap_or(true);
        if !done {
            pending.push(relation.table);
        }
    }

    if let Some(table) = registry.table_mut(id) {
        table.relations.extend(added);
    }
}
