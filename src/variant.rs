//! Logical record shapes for the seven Oura exports.
//!
//! Each [`Variant`] owns a destination table, a minimum row width and an
//! ordered list of [`FieldSpec`]s. Field order is the column order of the
//! generated `INSERT`.
//!
//! ```sql
//! INSERT INTO public.oura_sleep (original_id, day, score, contributors, timestamp)
//! VALUES ('abc123', '2024-01-01', 85, '{"total": 90}', '2024-01-01T07:00:00');
//! ```

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Variant {
    Sleep,
    HeartRate,
    Activity,
    Readiness,
    SleepTime,
    Spo2,
    Stress,
}

/// How a raw cell is turned into a SQL literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Identifier,
    Date,
    Integer,
    Decimal,
    Text,
    /// Python-style dict text that must become JSON before insertion.
    Json,
}

impl FieldKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Decimal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Identifier => "identifier",
            FieldKind::Date => "date",
            FieldKind::Integer => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Text => "text",
            FieldKind::Json => "json",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One semantic field of a logical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Destination column name.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Header names accepted for this field, in order of preference.
    pub aliases: &'static [&'static str],
    /// Column used when no alias matches the header.
    pub position: Option<usize>,
    /// Only emitted when the destination table declares the column.
    pub schema_gated: bool,
    /// Binds to a detected leading row-index column.
    pub row_index: bool,
}

impl FieldSpec {
    pub const fn new(
        name: &'static str,
        kind: FieldKind,
        aliases: &'static [&'static str],
        position: Option<usize>,
    ) -> Self {
        Self {
            name,
            kind,
            aliases,
            position,
            schema_gated: false,
            row_index: false,
        }
    }

    pub const fn gated(mut self) -> Self {
        self.schema_gated = true;
        self
    }

    pub const fn row_index(name: &'static str) -> Self {
        let mut spec = Self::new(name, FieldKind::Integer, &[], None);
        spec.row_index = true;
        spec
    }
}

const ID_ALIASES: &[&str] = &["id", "original_id"];

const SLEEP_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("original_id", FieldKind::Identifier, ID_ALIASES, Some(1)),
    FieldSpec::new("day", FieldKind::Date, &["day"], Some(3)),
    FieldSpec::new("score", FieldKind::Integer, &["score"], Some(4)),
    FieldSpec::new("contributors", FieldKind::Json, &["contributors"], Some(2)),
    FieldSpec::new("timestamp", FieldKind::Date, &["timestamp"], Some(5)),
];

const HEART_RATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("bpm", FieldKind::Integer, &["bpm"], Some(1)),
    FieldSpec::new("source", FieldKind::Text, &["source"], Some(2)),
    FieldSpec::new("timestamp", FieldKind::Date, &["timestamp"], Some(3)),
    FieldSpec::new("type", FieldKind::Text, &["type"], None).gated(),
];

const ACTIVITY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("original_id", FieldKind::Identifier, ID_ALIASES, Some(1)),
    FieldSpec::new("day", FieldKind::Date, &["day"], Some(2)),
    FieldSpec::new("score", FieldKind::Integer, &["score"], Some(3)),
    FieldSpec::new("active_calories", FieldKind::Integer, &["active_calories"], None),
    FieldSpec::new("steps", FieldKind::Integer, &["steps"], None),
    FieldSpec::new(
        "calories_out",
        FieldKind::Decimal,
        &["calories", "calories_out"],
        None,
    ),
];

const READINESS_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("original_id", FieldKind::Identifier, ID_ALIASES, Some(1)),
    FieldSpec::new("day", FieldKind::Date, &["day"], Some(3)),
    FieldSpec::new("score", FieldKind::Integer, &["score"], Some(4)),
    FieldSpec::new("contributors", FieldKind::Json, &["contributors"], Some(2)),
];

const SLEEP_TIME_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("original_id", FieldKind::Identifier, ID_ALIASES, Some(1)),
    FieldSpec::new("day", FieldKind::Date, &["day"], Some(2)),
    FieldSpec::new("bedtime_start", FieldKind::Date, &["bedtime_start"], Some(3)),
    FieldSpec::new("bedtime_end", FieldKind::Date, &["bedtime_end"], Some(4)),
    FieldSpec::new("duration", FieldKind::Integer, &["duration"], Some(5)),
];

const SPO2_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("original_id", FieldKind::Identifier, ID_ALIASES, Some(1)),
    FieldSpec::new("day", FieldKind::Date, &["day"], Some(2)),
    FieldSpec::new(
        "spo2_percentage",
        FieldKind::Json,
        &["spo2_percentage", "spo2", "avg_spo2", "average_spo2"],
        Some(3),
    ),
    FieldSpec::new(
        "breathing_disturbance_index",
        FieldKind::Decimal,
        &["breathing_disturbance_index", "bdi", "breathing_index"],
        Some(4),
    ),
];

const STRESS_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("original_id", FieldKind::Identifier, ID_ALIASES, Some(1)),
    FieldSpec::new("day", FieldKind::Date, &["day"], Some(2)),
    FieldSpec::new("stress_high", FieldKind::Integer, &["stress_high"], Some(3)),
    FieldSpec::new("recovery_high", FieldKind::Integer, &["recovery_high"], Some(4)),
    FieldSpec::new("day_summary", FieldKind::Text, &["day_summary"], Some(5)),
];

impl Variant {
    pub const ALL: [Variant; 7] = [
        Variant::Sleep,
        Variant::HeartRate,
        Variant::Activity,
        Variant::Readiness,
        Variant::SleepTime,
        Variant::Spo2,
        Variant::Stress,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Sleep => "sleep",
            Variant::HeartRate => "heart_rate",
            Variant::Activity => "activity",
            Variant::Readiness => "readiness",
            Variant::SleepTime => "sleep_time",
            Variant::Spo2 => "spo2",
            Variant::Stress => "stress",
        }
    }

    /// Unqualified destination table name.
    pub fn table_name(self) -> &'static str {
        match self {
            Variant::Sleep => "oura_sleep",
            Variant::HeartRate => "oura_heart_rate",
            Variant::Activity => "oura_activity",
            Variant::Readiness => "oura_readiness",
            Variant::SleepTime => "oura_sleep_time",
            Variant::Spo2 => "oura_spo2",
            Variant::Stress => "oura_stress",
        }
    }

    /// Rows narrower than this are skipped.
    pub fn min_columns(self) -> usize {
        match self {
            Variant::Sleep | Variant::Activity | Variant::Readiness => 5,
            Variant::HeartRate | Variant::Spo2 => 3,
            Variant::SleepTime | Variant::Stress => 6,
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Variant::Sleep => SLEEP_FIELDS,
            Variant::HeartRate => HEART_RATE_FIELDS,
            Variant::Activity => ACTIVITY_FIELDS,
            Variant::Readiness => READINESS_FIELDS,
            Variant::SleepTime => SLEEP_TIME_FIELDS,
            Variant::Spo2 => SPO2_FIELDS,
            Variant::Stress => STRESS_FIELDS,
        }
    }

    pub fn has_gated_fields(self) -> bool {
        self.fields().iter().any(|field| field.schema_gated)
    }

    pub fn default_input(self) -> &'static str {
        match self {
            Variant::Sleep => "sleep_data.csv",
            Variant::HeartRate => "heart_rate_data.csv",
            Variant::Activity => "daily_data.csv",
            Variant::Readiness => "daily_readiness.csv",
            Variant::SleepTime => "sleep_time_data.csv",
            Variant::Spo2 => "blood_oxygen_data.csv",
            Variant::Stress => "stress_data.csv",
        }
    }

    pub fn default_output(self) -> String {
        format!("{}_inserts.sql", self.as_str())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
