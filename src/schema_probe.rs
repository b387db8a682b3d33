//! Best-effort lookups against a `CREATE TABLE` script.
//!
//! Some deployments of the heart-rate table carry a `type` column and some do
//! not. The mapper asks a [`SchemaProbe`] before choosing its column list;
//! the answer is tri-state so a missing or unreadable script can fall back to
//! a default instead of failing the table.

use std::{
    fs,
    io::ErrorKind,
    path::PathBuf,
};

use log::{debug, info, warn};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPresence {
    Present,
    Absent,
    /// The script is missing, unreadable or does not declare the table.
    Unknown,
}

impl ColumnPresence {
    /// Unknown is treated as present.
    pub fn include(self) -> bool {
        !matches!(self, ColumnPresence::Absent)
    }
}

pub trait SchemaProbe {
    fn column_presence(&self, table: &str, column: &str) -> ColumnPresence;
}

/// A probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedPresence(pub ColumnPresence);

impl SchemaProbe for FixedPresence {
    fn column_presence(&self, _table: &str, _column: &str) -> ColumnPresence {
        self.0
    }
}

/// Reads table declarations from a SQL script on disk.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    path: PathBuf,
}

impl SchemaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SchemaProbe for SchemaFile {
    fn column_presence(&self, table: &str, column: &str) -> ColumnPresence {
        let sql = match fs::read_to_string(&self.path) {
            Ok(sql) => sql,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("Schema file {:?} not found", self.path);
                return ColumnPresence::Unknown;
            }
            Err(err) => {
                warn!("Error checking schema file {:?}: {err}", self.path);
                return ColumnPresence::Unknown;
            }
        };
        let presence = match table_declares_column(&sql, table, column) {
            Some(true) => ColumnPresence::Present,
            Some(false) => ColumnPresence::Absent,
            None => ColumnPresence::Unknown,
        };
        if presence != ColumnPresence::Unknown {
            info!(
                "Detected {column} column in {table} schema: {}",
                presence.include()
            );
        }
        presence
    }
}

/// `Some(declared)` when the script defines `table`, `None` otherwise.
pub fn table_declares_column(sql: &str, table: &str, column: &str) -> Option<bool> {
    let table_pattern = format!(
        r"(?is)create\s+table\s+(?:if\s+not\s+exists\s+)?(?:\w+\.)?{}\b([^;]*)",
        regex::escape(table)
    );
    let column_pattern = format!(r#"(?im)(?:^|[(,])\s*"?{}"?\s+[a-z]"#, regex::escape(column));
    let table_re = Regex::new(&table_pattern).ok()?;
    let column_re = Regex::new(&column_pattern).ok()?;
    let comment_re = Regex::new(r"--[^\n]*").ok()?;
    let sql = comment_re.replace_all(sql, "");
    let body = table_re.captures(&sql)?.get(1)?.as_str();
    Some(column_re.is_match(body))
}
