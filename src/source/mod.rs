//! Relation record sources.
//!
//! A source supplies every foreign key of a schema, regardless of which table
//! is analysed; the relation graph builder does the reachability filtering.
//!
//! - `sqlite` - SQLite database files, read through `pragma_foreign_key_list`
//! - `dump` - SQL scripts with CREATE TABLE / ALTER TABLE statements
//! - `compression` - gzip, bzip2, xz and zstd wrappers for dumps

mod compression;
mod dump;
mod sqlite;

pub use compression::Compression;
pub use dump::DumpSource;
pub use sqlite::SqliteSource;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, SourceError};
use crate::schema::{canonical_table_name, RelationRecord};

/// Header every SQLite 3 database file starts with
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Kind of schema source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Detect from the file header
    #[default]
    Auto,
    /// SQLite database file
    Sqlite,
    /// SQL script, possibly compressed
    Sql,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(SourceKind::Auto),
            "sqlite" | "sqlite3" | "db" => Ok(SourceKind::Sqlite),
            "sql" | "dump" => Ok(SourceKind::Sql),
            _ => Err(format!(
                "Unknown source: {}. Valid options: auto, sqlite, sql",
                s
            )),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Auto => write!(f, "auto"),
            SourceKind::Sqlite => write!(f, "sqlite"),
            SourceKind::Sql => write!(f, "sql"),
        }
    }
}

/// Decide between SQLite and SQL dump by looking at the first bytes of the file
pub fn detect_kind(path: &Path) -> Result<SourceKind> {
    if !path.exists() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(SourceError::UnsupportedSource(path.to_path_buf()));
    }

    let mut header = [0u8; 16];
    let mut file = File::open(path)?;
    let mut read = 0;
    while read < header.len() {
        let n = file.read(&mut header[read..])?;
        if n == 0 {
            break;
        }
        read += n;
    }

    if read == header.len() && &header == SQLITE_HEADER {
        Ok(SourceKind::Sqlite)
    } else {
        Ok(SourceKind::Sql)
    }
}

/// An opened schema source of either kind
pub enum RelationSource {
    Sqlite(SqliteSource),
    Dump(DumpSource),
}

impl RelationSource {
    /// Open `path` as the given kind, detecting it first for `SourceKind::Auto`
    pub fn open(path: &Path, kind: SourceKind) -> Result<Self> {
        let kind = match kind {
            SourceKind::Auto => detect_kind(path)?,
            other => other,
        };

        match kind {
            SourceKind::Sqlite => Ok(RelationSource::Sqlite(SqliteSource::open(path)?)),
            _ => Ok(RelationSource::Dump(DumpSource::open(path)?)),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            RelationSource::Sqlite(_) => SourceKind::Sqlite,
            RelationSource::Dump(_) => SourceKind::Sql,
        }
    }

    /// All tables known to the schema
    pub fn tables(&self) -> Result<Vec<String>> {
        match self {
            RelationSource::Sqlite(source) => source.tables(),
            RelationSource::Dump(source) => Ok(source.tables().to_vec()),
        }
    }

    /// Declared spelling of `name`, or `UnknownTable` if the schema lacks it
    pub fn resolve_table(&self, name: &str) -> Result<String> {
        let tables = self.tables()?;
        canonical_table_name(&tables, name)
            .map(str::to_string)
            .ok_or_else(|| SourceError::UnknownTable(name.to_string()))
    }

    /// Every foreign key in the schema
    pub fn relation_records(&self) -> Result<Vec<RelationRecord>> {
        match self {
            RelationSource::Sqlite(source) => source.relation_records(),
            RelationSource::Dump(source) => Ok(source.relation_records().to_vec()),
        }
    }
}
