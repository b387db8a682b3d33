//! Row-to-`INSERT` mapping and per-table script generation.
//!
//! [`RecordMapper`] turns one decoded row into an [`InsertStatement`] using a
//! resolved [`ColumnMap`]. [`write_inserts`] drives it across a whole export:
//! it reads the header, samples the first rows for index detection, then
//! streams every row through the mapper. Short rows are skipped and rows with
//! bad fields are dropped with a warning; neither stops the file.

use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use csv::ByteRecord;
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info, warn};

use crate::{
    error::{FieldError, RowError},
    io_utils,
    normalize::NormalizeOptions,
    resolver::{ColumnMap, INDEX_SAMPLE_ROWS},
    schema_probe::SchemaProbe,
    statement::{InsertStatement, qualified_table},
    variant::Variant,
};

const PROGRESS_INTERVAL: usize = 1000;

pub struct RecordMapper {
    variant: Variant,
    table: String,
    columns: ColumnMap,
    included: Vec<bool>,
    options: NormalizeOptions,
}

impl RecordMapper {
    pub fn new(
        variant: Variant,
        table_schema: &str,
        columns: ColumnMap,
        options: NormalizeOptions,
        probe: &dyn SchemaProbe,
    ) -> Self {
        let included = columns
            .bindings()
            .iter()
            .map(|binding| {
                !binding.field.schema_gated
                    || probe
                        .column_presence(variant.table_name(), binding.field.name)
                        .include()
            })
            .collect();
        Self {
            variant,
            table: qualified_table(table_schema, variant.table_name()),
            columns,
            included,
            options,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Destination columns in statement order.
    pub fn insert_columns(&self) -> Vec<&'static str> {
        self.columns
            .bindings()
            .iter()
            .zip(&self.included)
            .filter(|(_, included)| **included)
            .map(|(binding, _)| binding.field.name)
            .collect()
    }

    /// `Ok(None)` when the row is narrower than the variant's minimum.
    pub fn map(&self, row: &[String]) -> Result<Option<InsertStatement>, FieldError> {
        if row.len() < self.variant.min_columns() {
            return Ok(None);
        }
        let mut statement = InsertStatement::new(self.table.as_str());
        for (binding, included) in self.columns.bindings().iter().zip(&self.included) {
            if !included {
                continue;
            }
            let literal = self.options.apply(&binding.field, binding.cell(row))?;
            statement.push(binding.field.name, literal);
        }
        Ok(Some(statement))
    }
}

/// Row counters for one generated script.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub rows_read: usize,
    pub written: usize,
    pub skipped_short: usize,
    pub dropped: usize,
}

pub struct GenerateOptions<'a> {
    pub table_schema: &'a str,
    pub normalize: NormalizeOptions,
    pub encoding: &'static Encoding,
    pub probe: &'a dyn SchemaProbe,
}

impl<'a> GenerateOptions<'a> {
    /// Defaults matching a plain `generate` run.
    pub fn with_probe(probe: &'a dyn SchemaProbe) -> Self {
        Self {
            table_schema: "public",
            normalize: NormalizeOptions::default(),
            encoding: UTF_8,
            probe,
        }
    }
}

/// Generates the script for `variant` from `input` into `output`, truncating
/// any previous script.
pub fn generate_inserts(
    variant: Variant,
    input: &Path,
    output: &Path,
    options: &GenerateOptions<'_>,
) -> Result<TableStats> {
    let file = File::open(input).with_context(|| format!("Opening input file {input:?}"))?;
    let mut writer = io_utils::create_output(output)?;
    let stats = write_inserts(variant, BufReader::new(file), &mut writer, options)
        .with_context(|| format!("Generating {variant} inserts from {input:?}"))?;
    writer
        .flush()
        .with_context(|| format!("Flushing output file {output:?}"))?;
    info!(
        "{variant} data SQL insert statements generated in {}",
        output.display()
    );
    info!(
        "Total {variant} records: {} read, {} written, {} short, {} dropped",
        stats.rows_read, stats.written, stats.skipped_short, stats.dropped
    );
    Ok(stats)
}

pub fn write_inserts<R, W>(
    variant: Variant,
    input: R,
    output: &mut W,
    options: &GenerateOptions<'_>,
) -> Result<TableStats>
where
    R: Read,
    W: Write,
{
    let mut reader = io_utils::open_csv_reader(input);
    let mut record = ByteRecord::new();
    if !reader
        .read_byte_record(&mut record)
        .context("Reading header row")?
    {
        warn!("{variant} input is empty");
        return Ok(TableStats::default());
    }
    let header =
        io_utils::decode_record(&record, options.encoding).context("Decoding header row")?;
    debug!("{variant} CSV headers: {header:?}");

    let mut pending = Vec::with_capacity(INDEX_SAMPLE_ROWS);
    while pending.len() < INDEX_SAMPLE_ROWS
        && reader
            .read_byte_record(&mut record)
            .context("Reading data row")?
    {
        let row = io_utils::decode_record(&record, options.encoding);
        pending.push((line_of(&record), row));
    }
    let sample = pending
        .iter()
        .filter_map(|(_, row)| row.as_ref().ok().cloned())
        .collect::<Vec<_>>();

    let columns = ColumnMap::resolve(&header, variant.fields(), &sample);
    if let Some(index) = columns.index_column() {
        debug!(
            "Detected index column at position {} ({:?})",
            index.position, index.evidence
        );
    }
    for field in columns.unresolved() {
        debug!("{variant} field '{}' has no column; using defaults", field.name);
    }
    let mapper = RecordMapper::new(
        variant,
        options.table_schema,
        columns,
        options.normalize,
        options.probe,
    );

    let mut script = ScriptWriter {
        mapper: &mapper,
        output,
        stats: TableStats::default(),
    };
    for (line, row) in pending {
        script.emit(line, row)?;
    }
    while reader
        .read_byte_record(&mut record)
        .context("Reading data row")?
    {
        let line = line_of(&record);
        script.emit(line, io_utils::decode_record(&record, options.encoding))?;
    }
    Ok(script.stats)
}

fn line_of(record: &ByteRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

struct ScriptWriter<'m, W> {
    mapper: &'m RecordMapper,
    output: &'m mut W,
    stats: TableStats,
}

impl<W: Write> ScriptWriter<'_, W> {
    fn emit(&mut self, line: u64, row: Result<Vec<String>, RowError>) -> Result<()> {
        let variant = self.mapper.variant();
        self.stats.rows_read += 1;
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                let raw = match &err {
                    RowError::Decode { row, .. } => row.clone(),
                    _ => String::new(),
                };
                warn!("Error processing {variant} row {line}: {err}; row data: {raw}");
                self.stats.dropped += 1;
                return Ok(());
            }
        };
        if self.stats.rows_read == 1 {
            debug!("First {variant} row: {row:?}");
        }
        match self.mapper.map(&row) {
            Ok(Some(statement)) => {
                writeln!(self.output, "{statement}").context("Writing insert statement")?;
                self.stats.written += 1;
                if self.stats.written % PROGRESS_INTERVAL == 0 {
                    debug!("Processed {} {variant} records...", self.stats.written);
                }
            }
            Ok(None) => self.stats.skipped_short += 1,
            Err(err) => {
                warn!(
                    "Error processing {variant} row {line}: {}; row data: {row:?}",
                    RowError::from(err)
                );
                self.stats.dropped += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_probe::{ColumnPresence, FixedPresence};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn mapper(variant: Variant, header: &[&str], presence: ColumnPresence) -> RecordMapper {
        let columns = ColumnMap::resolve(&strings(header), variant.fields(), &[]);
        RecordMapper::new(
            variant,
            "public",
            columns,
            NormalizeOptions::default(),
            &FixedPresence(presence),
        )
    }

    #[test]
    fn short_rows_produce_nothing() {
        let mapper = mapper(
            Variant::SleepTime,
            &["", "id", "day", "bedtime_start", "bedtime_end", "duration"],
            ColumnPresence::Unknown,
        );
        let row = strings(&["0", "a", "2024-01-01", "x", "y"]);
        assert_eq!(mapper.map(&row), Ok(None));
    }

    #[test]
    fn heart_rate_type_column_follows_probe() {
        let header = ["index", "bpm", "source", "timestamp"];
        let row = strings(&["0", "62", "awake", "2024-01-01T00:00:00"]);

        let with_type = mapper(Variant::HeartRate, &header, ColumnPresence::Unknown);
        assert_eq!(
            with_type.map(&row).expect("map").expect("statement").to_string(),
            "INSERT INTO public.oura_heart_rate (bpm, source, timestamp, type) VALUES (62, 'awake', '2024-01-01T00:00:00', '');"
        );

        let without_type = mapper(Variant::HeartRate, &header, ColumnPresence::Absent);
        assert_eq!(without_type.insert_columns(), vec!["bpm", "source", "timestamp"]);
        assert_eq!(
            without_type.map(&row).expect("map").expect("statement").to_string(),
            "INSERT INTO public.oura_heart_rate (bpm, source, timestamp) VALUES (62, 'awake', '2024-01-01T00:00:00');"
        );
    }

    #[test]
    fn stream_skips_short_rows_and_keeps_going() {
        let csv = ",id,day,stress_high,recovery_high,day_summary\n\
                   0,s1,2024-01-01,3600,1800,normal\n\
                   1,s2\n\
                   2,s3,2024-01-03,,,restored\n";
        let probe = FixedPresence(ColumnPresence::Unknown);
        let mut out = Vec::new();
        let stats = write_inserts(
            Variant::Stress,
            csv.as_bytes(),
            &mut out,
            &GenerateOptions::with_probe(&probe),
        )
        .expect("generate");
        assert_eq!(
            stats,
            TableStats {
                rows_read: 3,
                written: 2,
                skipped_short: 1,
                dropped: 0
            }
        );
        let text = String::from_utf8(out).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(
            lines[1],
            "INSERT INTO public.oura_stress (original_id, day, stress_high, recovery_high, day_summary) VALUES ('s3', '2024-01-03', NULL, NULL, 'restored');"
        );
    }

    #[test]
    fn empty_input_writes_nothing() {
        let probe = FixedPresence(ColumnPresence::Unknown);
        let mut out = Vec::new();
        let stats = write_inserts(
            Variant::Sleep,
            "".as_bytes(),
            &mut out,
            &GenerateOptions::with_probe(&probe),
        )
        .expect("generate");
        assert_eq!(stats, TableStats::default());
        assert!(out.is_empty());
    }
}
