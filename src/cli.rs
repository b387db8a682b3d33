use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{normalize::NumericPolicy, variant::Variant};

#[derive(Debug, Parser)]
#[command(author, version, about = "Turn Oura CSV exports into SQL insert scripts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate INSERT scripts for every configured export
    Generate(GenerateArgs),
    /// Show how a CSV export's columns would be read
    Inspect(InspectArgs),
}

#[derive(Debug, Args, Default)]
pub struct GenerateArgs {
    /// CSV URL to download into the input directory, or a local path (ignored)
    pub source: Option<String>,
    /// YAML job file overriding the default export layout
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory holding the CSV exports
    #[arg(long = "input-dir")]
    pub input_dir: Option<PathBuf>,
    /// Directory receiving the generated scripts (created if absent)
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// CREATE TABLE script consulted for optional columns
    #[arg(long = "schema-file")]
    pub schema_file: Option<PathBuf>,
    /// Schema qualifier for table names (use "" for none)
    #[arg(long = "table-schema")]
    pub table_schema: Option<String>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Handling of numeric cells that do not parse as numbers
    #[arg(long = "numeric-policy", value_enum)]
    pub numeric_policy: Option<NumericPolicy>,
    /// Double single quotes inside text values
    #[arg(long = "escape-text-quotes")]
    pub escape_text_quotes: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// CSV export to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Resolve the columns of this record variant
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,
    /// Number of data rows to display
    #[arg(long, default_value_t = 3)]
    pub rows: usize,
    /// CREATE TABLE script consulted for optional columns
    #[arg(long = "schema-file", default_value = "database.sql")]
    pub schema_file: PathBuf,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}
