//! Foreign keys read from a SQLite database file.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{Result, SourceError};
use crate::schema::{resolve_record_names, DeleteAction, RelationRecord};

/// Read-only view of a SQLite database's schema.
pub struct SqliteSource {
    conn: Connection,
    path: PathBuf,
}

impl SqliteSource {
    /// Open an existing database without write access.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// User tables in name order.
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(names)
    }

    /// Every foreign key of every user table.
    ///
    /// Composite keys are reported by SQLite once per column and collapse to a
    /// single record here.
    pub fn relation_records(&self) -> Result<Vec<RelationRecord>> {
        let tables = self.tables()?;
        let mut stmt = self.conn.prepare(
            "SELECT id, \"table\", on_delete FROM pragma_foreign_key_list(?1)
             ORDER BY id, seq",
        )?;

        let mut records = Vec::new();
        for table in &tables {
            let rows = stmt.query_map([table], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;

            let mut last_id = None;
            for row in rows {
                let (id, parent, on_delete) = row?;
                if last_id == Some(id) {
                    continue;
                }
                last_id = Some(id);
                records.push(RelationRecord::new(
                    table.as_str(),
                    parent,
                    DeleteAction::from_sql(&on_delete),
                ));
            }
        }

        resolve_record_names(&tables, &mut records);

        debug!(
            path = %self.path.display(),
            tables = tables.len(),
            foreign_keys = records.len(),
            "read sqlite schema"
        );

        Ok(records)
    }
}
