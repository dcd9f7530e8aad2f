//! Schema model for foreign-key cascade analysis.
//!
//! This module provides:
//! - Raw foreign-key records as reported by a relation source
//! - The table registry that hands out one shared node per table name
//! - SQL DDL parsing for extracting foreign keys from schema dumps
//! - Relation graph construction over the connected component of a table

mod ddl;
mod graph;

pub use ddl::*;
pub use graph::*;

use ahash::AHashMap;
use serde::Serialize;
use std::fmt;

/// Unique identifier for a table within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.0)
    }
}

/// Referential action taken when a referenced row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl DeleteAction {
    /// Parse the textual action used by SQLite and SQL DDL.
    ///
    /// Matching is case-insensitive and tolerates any run of whitespace
    /// between words. Unrecognised text is treated as `NO ACTION`.
    pub fn from_sql(action: &str) -> Self {
        let normalized = action
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();

        match normalized.as_str() {
            "CASCADE" => DeleteAction::Cascade,
            "RESTRICT" => DeleteAction::Restrict,
            "SET NULL" => DeleteAction::SetNull,
            "SET DEFAULT" => DeleteAction::SetDefault,
            _ => DeleteAction::NoAction,
        }
    }

    /// Whether deleting a parent row also removes the dependent rows
    pub fn cascades(self) -> bool {
        self == DeleteAction::Cascade
    }
}

impl fmt::Display for DeleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteAction::NoAction => write!(f, "NO ACTION"),
            DeleteAction::Restrict => write!(f, "RESTRICT"),
            DeleteAction::Cascade => write!(f, "CASCADE"),
            DeleteAction::SetNull => write!(f, "SET NULL"),
            DeleteAction::SetDefault => write!(f, "SET DEFAULT"),
        }
    }
}

/// One foreign key as reported by a relation source.
///
/// The referencing columns are irrelevant to cascade analysis and are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRecord {
    /// Table holding the foreign key
    pub child_table: String,
    /// Table the foreign key points at
    pub parent_table: String,
    /// Action applied to child rows when a parent row is deleted
    pub on_delete: DeleteAction,
}

impl RelationRecord {
    pub fn new(
        child_table: impl Into<String>,
        parent_table: impl Into<String>,
        on_delete: DeleteAction,
    ) -> Self {
        Self {
            child_table: child_table.into(),
            parent_table: parent_table.into(),
            on_delete,
        }
    }

    pub fn is_self_reference(&self) -> bool {
        self.child_table == self.parent_table
    }
}

/// Find the declared spelling of a table name.
///
/// Tries an exact match first, then a case-insensitive one, since SQL
/// identifiers are usually case-insensitive but sources report them as written.
pub fn canonical_table_name<'a>(tables: &'a [String], name: &str) -> Option<&'a str> {
    tables
        .iter()
        .find(|t| t.as_str() == name)
        .or_else(|| tables.iter().find(|t| t.eq_ignore_ascii_case(name)))
        .map(String::as_str)
}

/// Rewrite the table names of every record to their declared spelling.
///
/// Names that match no declared table are left untouched.
pub fn resolve_record_names(tables: &[String], records: &mut [RelationRecord]) {
    for record in records.iter_mut() {
        if let Some(name) = canonical_table_name(tables, &record.child_table) {
            if name != record.child_table {
                record.child_table = name.to_string();
            }
        }
        if let Some(name) = canonical_table_name(tables, &record.parent_table) {
            if name != record.parent_table {
                record.parent_table = name.to_string();
            }
        }
    }
}

/// Role a table plays in a relation, seen from the table holding the relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    /// The related table references this one; deleting here threatens it
    Parent,
    /// This table references the related one; irrelevant to its own deletion
    Child,
}

/// A foreign-key edge as seen from one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRelation {
    /// Role of the table that holds this relation
    pub owner: TableRole,
    /// The other end of the edge
    pub table: TableId,
    /// Whether the edge's delete action is CASCADE
    pub cascades: bool,
}

/// One schema table node
#[derive(Debug, Clone)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Relations in discovery order
    pub relations: Vec<TableRelation>,
    /// Set once the builder has appended this table's relations
    pub(crate) collected: bool,
}

impl Table {
    fn new(name: String) -> Self {
        Self {
            name,
            relations: Vec::new(),
            collected: false,
        }
    }

    /// Relations where another table depends on this one
    pub fn dependents(&self) -> impl Iterator<Item = &TableRelation> {
        self.relations
            .iter()
            .filter(|r| r.owner == TableRole::Parent)
    }

    /// Relations where this table depends on another one
    pub fn references(&self) -> impl Iterator<Item = &TableRelation> {
        self.relations.iter().filter(|r| r.owner == TableRole::Child)
    }
}

/// Arena of tables keyed by name.
///
/// Guarantees exactly one node per table name for the lifetime of an analysis.
#[derive(Debug, Default)]
pub struct TableRegistry {
    /// Map from table name to table ID
    ids: AHashMap<String, TableId>,
    /// Tables indexed by TableId
    tables: Vec<Table>,
}

impl TableRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle for `name`, creating an empty table on first use
    pub fn get_or_create(&mut self, name: &str) -> TableId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = TableId(self.tables.len() as u32);
        self.ids.insert(name.to_string(), id);
        self.tables.push(Table::new(name.to_string()));
        id
    }

    /// Get the handle for `name` if the table has been registered
    pub fn get(&self, name: &str) -> Option<TableId> {
        self.ids.get(name).copied()
    }

    /// Get table by ID
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.0 as usize)
    }

    pub(crate) fn table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.get_mut(id.0 as usize)
    }

    /// Get the table name for a table ID
    pub fn name(&self, id: TableId) -> Option<&str> {
        self.table(id).map(|t| t.name.as_str())
    }

    /// Get the number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterate over tables in creation order together with their IDs
    pub fn iter(&self) -> impl Iterator<Item = (TableId, &Table)> {
        self.tables
            .iter()
            .enumerate()
            .map(|(i, t)| (TableId(i as u32), t))
    }
}
