//! Batch driver for the `generate` command.
//!
//! Walks the configured (variant, input, output) jobs in order, generating
//! one script per export that exists. A missing export is recorded and
//! skipped; a failing export is logged and skipped. The `jsonb` closing script
//! is always written last, and the run ends with a `successful/total` summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use crate::{
    cli::GenerateArgs,
    config::{BatchConfig, TableJob},
    fetch, io_utils,
    jsonb::write_jsonb_updates,
    mapper::{GenerateOptions, TableStats, generate_inserts},
    schema_probe::{SchemaFile, SchemaProbe},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Processed(TableStats),
    Missing,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TableOutcome {
    pub job: TableJob,
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: TableStatus,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<TableOutcome>,
    pub jsonb_written: bool,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn successful(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, TableStatus::Processed(_)))
            .count()
    }

    pub fn missing(&self) -> impl Iterator<Item = &TableOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == TableStatus::Missing)
    }

    pub fn is_complete(&self) -> bool {
        self.successful() == self.total()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Summary: Successfully processed {}/{} CSV files.",
            self.successful(),
            self.total()
        )
    }
}

pub fn execute(args: &GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            BatchConfig::load(path).with_context(|| format!("Loading config from {path:?}"))?
        }
        None => BatchConfig::default(),
    };
    config.apply_args(args);
    config.validate()?;

    if let Some(source) = args.source.as_deref() {
        if fetch::is_csv_url(source) {
            info!("Downloading CSV from URL: {source}");
            io_utils::ensure_dir(&config.input_dir)?;
            fetch::download_csv(source, &config.input_dir)?;
            info!("You can now process this file. Please run the command again.");
            return Ok(());
        }
        debug!("Ignoring non-URL source argument '{source}'");
    }

    let probe = SchemaFile::new(&config.schema_file);
    run_batch(&config, &probe)?;
    Ok(())
}

/// Runs every job in `config`. Only an unusable output directory or encoding
/// fails the whole batch.
pub fn run_batch(config: &BatchConfig, probe: &dyn SchemaProbe) -> Result<BatchReport> {
    let encoding = io_utils::resolve_encoding(config.input_encoding.as_deref())?;
    io_utils::ensure_dir(&config.output_dir)?;
    let options = GenerateOptions {
        table_schema: &config.table_schema,
        normalize: config.normalize_options(),
        encoding,
        probe,
    };

    let mut report = BatchReport::default();
    for job in &config.tables {
        let input = config.input_path(job);
        let output = config.output_path(job);
        info!("{}", "=".repeat(80));
        info!("Processing {}...", input.display());

        let status = if !input.exists() {
            warn!("{} not found", input.display());
            TableStatus::Missing
        } else {
            match generate_inserts(job.variant, &input, &output, &options) {
                Ok(stats) => TableStatus::Processed(stats),
                Err(err) => {
                    error!("ERROR processing {}: {err:#}", input.display());
                    TableStatus::Failed(format!("{err:#}"))
                }
            }
        };
        report.outcomes.push(TableOutcome {
            job: job.clone(),
            input,
            output,
            status,
        });
    }

    report.jsonb_written = match write_jsonb_updates(&config.jsonb_path(), &config.table_schema) {
        Ok(()) => true,
        Err(err) => {
            error!("ERROR creating JSONB update statements: {err:#}");
            false
        }
    };

    log_summary(config, &report);
    Ok(report)
}

fn log_summary(config: &BatchConfig, report: &BatchReport) {
    info!("{}", "=".repeat(80));
    info!("{}", report.summary_line());

    if report.successful() > 0 {
        info!("Next steps:");
        info!(
            "1. Create your tables using the {} script",
            config.schema_file.display()
        );
        info!(
            "2. Run each generated SQL file in {}",
            config.output_dir.display()
        );
        info!(
            "3. Run {} to convert text fields to JSONB format",
            config.jsonb_path().display()
        );
    }

    if !report.is_complete() {
        warn!("Some files were not processed successfully. Please check the errors above.");
        let missing = report.missing().collect::<Vec<_>>();
        if !missing.is_empty() {
            for outcome in &missing {
                warn!("Missing input: {}", outcome.input.display());
            }
            warn!("If files are missing, you can download them with:");
            warn!("  oura-inserts generate URL_TO_CSV");
        }
    }
}
