//! I/O helpers for reading exports and writing SQL scripts.
//!
//! - **Reading**: CSV readers are flexible, so short rows reach the mapper
//!   and can be skipped there instead of aborting the file. The header row is
//!   read as an ordinary record.
//! - **Encoding**: cells are decoded through `encoding_rs`, UTF-8 by default.
//! - **Writing**: scripts are created in truncate mode, one per run.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use itertools::Itertools;

use crate::error::RowError;

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn open_csv_reader<R>(reader: R) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    Ok(open_csv_reader(BufReader::new(file)))
}

pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> std::result::Result<Vec<String>, RowError> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            if had_errors {
                Err(RowError::Decode {
                    encoding: encoding.name(),
                    row: lossy_row(record),
                })
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}

fn lossy_row(record: &csv::ByteRecord) -> String {
    record.iter().map(String::from_utf8_lossy).join(",")
}

/// Creates (or truncates) an output script.
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    Ok(BufWriter::new(file))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Creating output directory {path:?}"))
}
