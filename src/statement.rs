//! Structural SQL statement builder.
//!
//! Columns and values are pushed as pairs, so an `INSERT` can never end up
//! with mismatched lists, unbalanced parentheses or a half-quoted value.

use std::fmt;

use itertools::Itertools;

use crate::normalize::Literal;

/// `schema.table`, or just `table` when no schema qualifier is configured.
pub fn qualified_table(schema: &str, table: &str) -> String {
    if schema.is_empty() {
        table.to_string()
    } else {
        format!("{schema}.{table}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    table: String,
    values: Vec<(&'static str, Literal)>,
}

impl InsertStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, column: &'static str, literal: Literal) -> &mut Self {
        self.values.push((column, literal));
        self
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "INSERT INTO {} ({}) VALUES ({});",
            self.table,
            self.values.iter().map(|(column, _)| column).join(", "),
            self.values.iter().map(|(_, literal)| literal).join(", ")
        )
    }
}
