//! Foreign keys parsed from a SQL schema dump.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Compression;
use crate::error::{Result, SourceError};
use crate::schema::{split_statements, DdlCollector, RelationRecord};

/// Tables and foreign keys declared in a SQL script.
pub struct DumpSource {
    path: PathBuf,
    compression: Compression,
    tables: Vec<String>,
    records: Vec<RelationRecord>,
}

impl DumpSource {
    /// Read and parse a dump, decompressing it according to its extension.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }

        let compression = Compression::from_path(path);
        let file = File::open(path)?;
        let mut reader = compression.wrap_reader(Box::new(file))?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let sql = String::from_utf8_lossy(&bytes);
        let mut collector = DdlCollector::new();
        let mut statements = 0usize;
        for stmt in split_statements(&sql) {
            collector.parse_statement(&stmt);
            statements += 1;
        }
        let (tables, records) = collector.finish();

        debug!(
            path = %path.display(),
            %compression,
            statements,
            tables = tables.len(),
            foreign_keys = records.len(),
            "parsed schema dump"
        );

        Ok(Self {
            path: path.to_path_buf(),
            compression,
            tables,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Declared tables in statement order
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Foreign keys in statement order
    pub fn relation_records(&self) -> &[RelationRecord] {
        &self.records
    }
}
