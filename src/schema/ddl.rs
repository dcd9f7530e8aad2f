//! SQL DDL parsing for foreign-key extraction.
//!
//! Parses CREATE TABLE and ALTER TABLE statements to extract:
//! - Declared table names
//! - Table-level FOREIGN KEY constraints
//! - Column-level REFERENCES clauses
//! - The ON DELETE action of each foreign key

use super::{resolve_record_names, DeleteAction, RelationRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// Regex to extract table name from CREATE TABLE
/// Supports: `table` (MySQL), "table" (PostgreSQL), [table] (MSSQL), table (SQLite/unquoted), schema.table
static CREATE_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*CREATE\s+(?:TEMP(?:ORARY)?\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?"#)
        .unwrap()
});

/// Regex to extract table name from ALTER TABLE
static ALTER_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s]+)[\]`"]?"#).unwrap()
});

/// Regex for FOREIGN KEY constraint with its trailing ON DELETE/ON UPDATE clauses.
/// The referenced column list is optional (SQLite allows `REFERENCES parent`).
/// MATCH and DEFERRABLE clauses may appear anywhere in the tail.
static FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)FOREIGN\s+KEY\s*\([^)]+\)\s*REFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(,;]+)[\]`"]?(?:\s*\([^)]*\))?((?:\s+ON\s+(?:DELETE|UPDATE)\s+(?:CASCADE|RESTRICT|NO\s+ACTION|SET\s+NULL|SET\s+DEFAULT)|\s+MATCH\s+\w+|\s+(?:NOT\s+)?DEFERRABLE(?:\s+INITIALLY\s+(?:DEFERRED|IMMEDIATE))?)*)"#,
    )
    .unwrap()
});

/// Regex for a column-level REFERENCES clause
static INLINE_REFERENCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bREFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(,;]+)[\]`"]?(?:\s*\([^)]*\))?((?:\s+ON\s+(?:DELETE|UPDATE)\s+(?:CASCADE|RESTRICT|NO\s+ACTION|SET\s+NULL|SET\s+DEFAULT)|\s+MATCH\s+\w+|\s+(?:NOT\s+)?DEFERRABLE(?:\s+INITIALLY\s+(?:DEFERRED|IMMEDIATE))?)*)"#,
    )
    .unwrap()
});

/// Regex for the ON DELETE action inside a referential-action tail
static ON_DELETE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)ON\s+DELETE\s+(CASCADE|RESTRICT|NO\s+ACTION|SET\s+NULL|SET\s+DEFAULT)")
        .unwrap()
});

/// Collector for foreign-key records found in DDL statements
#[derive(Debug, Default)]
pub struct DdlCollector {
    tables: Vec<String>,
    records: Vec<RelationRecord>,
}

impl DdlCollector {
    /// Create a new empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse any statement, ignoring everything but CREATE TABLE and ALTER TABLE
    pub fn parse_statement(&mut self, stmt: &str) -> Option<String> {
        if CREATE_TABLE_NAME_RE.is_match(stmt) {
            self.parse_create_table(stmt)
        } else if ALTER_TABLE_NAME_RE.is_match(stmt) {
            self.parse_alter_table(stmt)
        } else {
            None
        }
    }

    /// Parse a CREATE TABLE statement, recording the table and its foreign keys
    pub fn parse_create_table(&mut self, stmt: &str) -> Option<String> {
        let table_name = extract_create_table_name(stmt)?;

        // A repeated CREATE TABLE (e.g. IF NOT EXISTS) keeps the first definition
        if self.has_table(&table_name) {
            return Some(table_name);
        }
        self.tables.push(table_name.clone());

        let body = extract_table_body(stmt)?;
        for part in split_table_body(&body) {
            let upper = part.to_uppercase();
            let actions = if upper.starts_with("CONSTRAINT") || upper.starts_with("FOREIGN KEY") {
                parse_foreign_keys(&part)
            } else {
                parse_inline_references(&part)
            };
            for (parent, on_delete) in actions {
                self.records
                    .push(RelationRecord::new(table_name.clone(), parent, on_delete));
            }
        }

        Some(table_name)
    }

    /// Parse an ALTER TABLE statement, adding its foreign keys to a known table
    pub fn parse_alter_table(&mut self, stmt: &str) -> Option<String> {
        let table_name = extract_alter_table_name(stmt)?;
        let table_name = self.resolve_table(&table_name)?.to_string();

        for (parent, on_delete) in parse_foreign_keys(stmt) {
            self.records
                .push(RelationRecord::new(table_name.clone(), parent, on_delete));
        }

        Some(table_name)
    }

    /// Check whether a table was declared (case-insensitive)
    pub fn has_table(&self, name: &str) -> bool {
        self.resolve_table(name).is_some()
    }

    /// Declared spelling of a table name: exact match first, then case-insensitive
    pub fn resolve_table(&self, name: &str) -> Option<&str> {
        super::canonical_table_name(&self.tables, name)
    }

    /// Declared tables in statement order
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Finish collecting, returning declared tables and their foreign keys.
    ///
    /// Referenced table names are rewritten to their declared spelling.
    pub fn finish(self) -> (Vec<String>, Vec<RelationRecord>) {
        let mut records = self.records;
        resolve_record_names(&self.tables, &mut records);
        (self.tables, records)
    }
}

/// Extract table name from CREATE TABLE statement
pub fn extract_create_table_name(stmt: &str) -> Option<String> {
    CREATE_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract table name from ALTER TABLE statement
pub fn extract_alter_table_name(stmt: &str) -> Option<String> {
    ALTER_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the body of a CREATE TABLE statement (between first ( and matching ))
fn extract_table_body(stmt: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in stmt.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if ch == '\\' && in_string {
            escape_next = true;
            continue;
        }
        if ch == '\'' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }

        match ch {
            '(' => {
                if depth == 0 {
                    start = Some(i + 1);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| stmt[s..i].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Split table body by commas, respecting nested parentheses and string literals
pub fn split_table_body(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for ch in body.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }
        if ch == '\\' && in_string {
            current.push(ch);
            escape_next = true;
            continue;
        }
        if ch == '\'' {
            in_string = !in_string;
        }

        match ch {
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth -= 1,
            ',' if !in_string && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Parse FOREIGN KEY constraints, returning (referenced table, ON DELETE action) pairs
fn parse_foreign_keys(stmt: &str) -> Vec<(String, DeleteAction)> {
    collect_references(&FOREIGN_KEY_RE, stmt)
}

/// Parse a column-level REFERENCES clause in a column definition
fn parse_inline_references(def: &str) -> Vec<(String, DeleteAction)> {
    collect_references(&INLINE_REFERENCES_RE, def)
}

fn collect_references(re: &Regex, text: &str) -> Vec<(String, DeleteAction)> {
    re.captures_iter(text)
        .filter_map(|caps| {
            let parent = caps.get(1)?.as_str().to_string();
            let on_delete = caps
                .get(2)
                .and_then(|tail| ON_DELETE_RE.captures(tail.as_str()))
                .and_then(|c| c.get(1))
                .map(|m| DeleteAction::from_sql(m.as_str()))
                .unwrap_or_default();
            Some((parent, on_delete))
        })
        .collect()
}

/// Split a SQL script into statements on top-level semicolons.
///
/// Quoted strings and identifiers are kept intact, including backslash-escaped
/// quotes inside string literals. `--` and `/* */` comments are dropped and
/// empty statements are skipped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            current.push(ch);
            // Backslash escapes only exist inside string literals (MySQL)
            if ch == '\\' && (q == '\'' || q == '"') {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                quote = Some(']');
                current.push(ch);
            }
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                current.push(' ');
            }
            ';' => {
                if !current.trim().is_empty() {
                    statements.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }

    statements
}
