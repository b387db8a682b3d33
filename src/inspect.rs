//! The `inspect` command: shows how an export's columns will be read.

use anyhow::{Context, Result, bail};
use csv::ByteRecord;
use log::info;

use crate::{
    cli::InspectArgs,
    io_utils,
    mapper::RecordMapper,
    normalize::NormalizeOptions,
    resolver::{ColumnMap, INDEX_SAMPLE_ROWS, IndexEvidence, detect_index_column},
    schema_probe::SchemaFile,
    table,
};

pub fn execute(args: &InspectArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mut reader = io_utils::open_csv_reader_from_path(&args.input)?;
    let mut record = ByteRecord::new();
    if !reader.read_byte_record(&mut record)? {
        bail!("{:?} is empty", args.input);
    }
    let header = io_utils::decode_record(&record, encoding).context("Decoding header row")?;

    let wanted = args.rows.max(INDEX_SAMPLE_ROWS);
    let mut sample = Vec::with_capacity(wanted);
    while sample.len() < wanted && reader.read_byte_record(&mut record)? {
        let line = record.position().map_or(0, |position| position.line());
        let row = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {line}"))?;
        sample.push(row);
    }

    info!("Sample data from {}:", args.input.display());
    println!("Headers: {}", header.join(", "));
    match detect_index_column(&header, &sample) {
        Some(index) => {
            let evidence = match index.evidence {
                IndexEvidence::EmptyHeader => "blank header",
                IndexEvidence::AscendingRun => "ascending values",
            };
            println!(
                "Detected index column at position {} ({evidence})",
                index.position
            );
        }
        None => println!("No index column detected"),
    }

    let mut cells = Vec::new();
    for (row_idx, row) in sample.iter().take(args.rows).enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            cells.push(vec![
                (row_idx + 1).to_string(),
                col_idx.to_string(),
                header.get(col_idx).cloned().unwrap_or_default(),
                value.clone(),
            ]);
        }
    }
    println!();
    print!("{}", table::render_table(&["row", "col", "header", "value"], &cells));

    let Some(variant) = args.variant else {
        return Ok(());
    };
    let columns = ColumnMap::resolve(&header, variant.fields(), &sample);
    let bindings = columns
        .bindings()
        .iter()
        .map(|binding| {
            vec![
                binding.field.name.to_string(),
                binding.field.kind.to_string(),
                binding.column.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
                binding
                    .column
                    .and_then(|c| header.get(c).cloned())
                    .unwrap_or_default(),
                binding
                    .strategy
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unresolved".into()),
            ]
        })
        .collect::<Vec<_>>();
    println!();
    println!("{variant} column map (minimum {} columns):", variant.min_columns());
    print!(
        "{}",
        table::render_table(&["field", "kind", "column", "header", "via"], &bindings)
    );

    let probe = SchemaFile::new(&args.schema_file);
    let mapper = RecordMapper::new(
        variant,
        "public",
        columns,
        NormalizeOptions::default(),
        &probe,
    );
    println!("Insert columns: {}", mapper.insert_columns().join(", "));
    if let Some(first) = sample.first() {
        match mapper.map(first) {
            Ok(Some(statement)) => println!("\nFirst statement:\n{statement}"),
            Ok(None) => println!("\nFirst row has fewer than {} columns", variant.min_columns()),
            Err(err) => println!("\nFirst row would be dropped: {err}"),
        }
    }
    Ok(())
}
