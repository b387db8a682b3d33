//! Raw cell to SQL literal conversion.
//!
//! Numeric kinds pass through unquoted (or become `NULL` when blank), text
//! kinds are wrapped in single quotes, and embedded dict text is requoted to
//! JSON before quoting. The result is always a complete literal token.

use std::fmt;

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::FieldError,
    variant::{FieldKind, FieldSpec},
};

/// A ready-to-splice SQL value token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Null,
    /// Unquoted numeric text.
    Number(String),
    /// Quoted text; the content is stored without the surrounding quotes.
    Text(String),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("NULL"),
            Literal::Number(value) => f.write_str(value),
            Literal::Text(value) => write!(f, "'{value}'"),
        }
    }
}

/// What to do with numeric cells that do not parse as numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Forward the text verbatim.
    #[default]
    Passthrough,
    /// Replace it with `NULL`.
    Null,
    /// Drop the row.
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub numeric: NumericPolicy,
    /// Double single quotes inside plain text literals.
    pub escape_text_quotes: bool,
}

impl NormalizeOptions {
    /// Converts the cell bound to `field`; `None` means the value is unavailable.
    pub fn apply(&self, field: &FieldSpec, raw: Option<&str>) -> Result<Literal, FieldError> {
        let raw = raw.unwrap_or("");
        match field.kind {
            FieldKind::Integer | FieldKind::Decimal => self.numeric_literal(field, raw),
            FieldKind::Json => Ok(json_literal(raw)),
            FieldKind::Identifier | FieldKind::Date | FieldKind::Text => {
                Ok(self.text_literal(raw))
            }
        }
    }

    fn numeric_literal(&self, field: &FieldSpec, raw: &str) -> Result<Literal, FieldError> {
        if raw.trim().is_empty() {
            return Ok(Literal::Null);
        }
        if self.numeric == NumericPolicy::Passthrough || is_numeric_text(raw) {
            return Ok(Literal::Number(raw.to_string()));
        }
        match self.numeric {
            NumericPolicy::Null => Ok(Literal::Null),
            _ => Err(FieldError::NotNumeric {
                field: field.name.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    fn text_literal(&self, raw: &str) -> Literal {
        if self.escape_text_quotes {
            Literal::Text(raw.replace('\'', "''"))
        } else {
            Literal::Text(raw.to_string())
        }
    }
}

/// Normalizes with the default options, which never reject a value.
pub fn normalize(raw: Option<&str>, kind: FieldKind) -> Literal {
    let field = FieldSpec::new("value", kind, &[], None);
    NormalizeOptions::default()
        .apply(&field, raw)
        .unwrap_or(Literal::Null)
}

/// Rewrites Python dict quoting (`{'a': 1}`) into JSON quoting (`{"a": 1}`).
pub fn requote_json(raw: &str) -> String {
    raw.replace('\'', "\"")
}

fn json_literal(raw: &str) -> Literal {
    let text = requote_json(raw);
    if text.is_empty() || text.eq_ignore_ascii_case("null") {
        return Literal::Null;
    }
    if serde_json::from_str::<serde_json::Value>(&text).is_err() {
        debug!("Embedded JSON does not parse after requoting: {text}");
    }
    Literal::Text(text)
}

fn is_numeric_text(raw: &str) -> bool {
    raw.trim().parse::<f64>().is_ok_and(f64::is_finite)
}
