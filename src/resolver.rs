//! Column resolution for loosely structured CSV exports.
//!
//! Exports produced by pandas carry an unnamed leading index column, headers
//! vary between API versions, and some files have no usable header names at
//! all. A [`ColumnMap`] binds each semantic field of a variant to a physical
//! column by trying an ordered list of [`Strategy`] values; the first one to
//! return a column wins. A field no strategy can place stays unresolved and
//! reads as "value unavailable".

use std::fmt;

use log::debug;

use crate::variant::FieldSpec;

/// Data rows inspected when looking for a synthetic row-index column.
pub const INDEX_SAMPLE_ROWS: usize = 5;
const INDEX_MIN_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEvidence {
    /// The header cell above the column is blank.
    EmptyHeader,
    /// Sampled values are digits forming a contiguous ascending run.
    AscendingRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexColumn {
    pub position: usize,
    pub evidence: IndexEvidence,
}

/// Finds a leading row-index column, if the file has one.
///
/// A blank header cell is conclusive. Otherwise at least three of the first
/// [`INDEX_SAMPLE_ROWS`] rows must agree on a column whose values are all
/// digits and run `min, min + 1, ...` in row order.
pub fn detect_index_column(header: &[String], sample: &[Vec<String>]) -> Option<IndexColumn> {
    if let Some(position) = header.iter().position(|cell| cell.trim().is_empty()) {
        return Some(IndexColumn {
            position,
            evidence: IndexEvidence::EmptyHeader,
        });
    }

    let rows = &sample[..sample.len().min(INDEX_SAMPLE_ROWS)];
    if rows.len() < INDEX_MIN_ROWS {
        return None;
    }
    (0..rows[0].len())
        .find(|&column| is_ascending_run(rows, column))
        .map(|position| IndexColumn {
            position,
            evidence: IndexEvidence::AscendingRun,
        })
}

fn is_ascending_run(rows: &[Vec<String>], column: usize) -> bool {
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(cell) = row.get(column) else {
            continue;
        };
        if cell.is_empty() || !cell.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match cell.parse::<u64>() {
            Ok(value) => values.push(value),
            Err(_) => return false,
        }
    }
    let Some(&start) = values.iter().min() else {
        return false;
    };
    values
        .iter()
        .enumerate()
        .all(|(offset, value)| value - start == offset as u64)
}

/// A single way of placing a field in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Binds fields that ask for the detected row-index column.
    RowIndex,
    /// First alias that exactly matches a header cell, case-sensitive.
    HeaderName,
    /// The variant's fixed default column.
    Position,
}

pub const DEFAULT_STRATEGIES: [Strategy; 3] =
    [Strategy::RowIndex, Strategy::HeaderName, Strategy::Position];

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::RowIndex => "row-index",
            Strategy::HeaderName => "header",
            Strategy::Position => "position",
        }
    }

    /// Returns a column only when this strategy is confident about it.
    pub fn resolve(
        self,
        field: &FieldSpec,
        header: &[String],
        index_column: Option<IndexColumn>,
    ) -> Option<usize> {
        match self {
            Strategy::RowIndex => {
                if field.row_index {
                    index_column.map(|index| index.position)
                } else {
                    None
                }
            }
            Strategy::HeaderName => field
                .aliases
                .iter()
                .find_map(|alias| header.iter().position(|cell| cell == alias)),
            Strategy::Position => {
                if field.row_index {
                    return None;
                }
                let position = field.position?;
                let is_index = index_column.is_some_and(|index| index.position == position);
                (position < header.len() && !is_index).then_some(position)
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub field: FieldSpec,
    pub column: Option<usize>,
    pub strategy: Option<Strategy>,
}

/// Field-to-column bindings for one header.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    bindings: Vec<Binding>,
    index_column: Option<IndexColumn>,
    width: usize,
}

impl ColumnMap {
    pub fn resolve(header: &[String], fields: &[FieldSpec], sample: &[Vec<String>]) -> Self {
        Self::resolve_with(header, fields, sample, &DEFAULT_STRATEGIES)
    }

    pub fn resolve_with(
        header: &[String],
        fields: &[FieldSpec],
        sample: &[Vec<String>],
        strategies: &[Strategy],
    ) -> Self {
        let index_column = detect_index_column(header, sample);
        let bindings = fields
            .iter()
            .map(|field| {
                let found = strategies.iter().find_map(|strategy| {
                    strategy
                        .resolve(field, header, index_column)
                        .map(|column| (column, *strategy))
                });
                if found.is_none() {
                    debug!("No column found for field '{}'", field.name);
                }
                Binding {
                    field: *field,
                    column: found.map(|(column, _)| column),
                    strategy: found.map(|(_, strategy)| strategy),
                }
            })
            .collect();
        Self {
            bindings,
            index_column,
            width: header.len(),
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn index_column(&self) -> Option<IndexColumn> {
        self.index_column
    }

    /// Number of header cells the map was resolved against.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn column_of(&self, field: &str) -> Option<usize> {
        self.bindings
            .iter()
            .find(|binding| binding.field.name == field)
            .and_then(|binding| binding.column)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &FieldSpec> {
        self.bindings
            .iter()
            .filter(|binding| binding.column.is_none())
            .map(|binding| &binding.field)
    }
}

impl Binding {
    /// The bound cell, or `None` when unresolved or the row is too short.
    pub fn cell<'r>(&self, row: &'r [String]) -> Option<&'r str> {
        self.column
            .and_then(|column| row.get(column))
            .map(String::as_str)
    }
}
