//! Batch configuration.
//!
//! The defaults describe the standard Oura export layout: seven CSV files in
//! the working directory, scripts under `sql_inserts/`. A YAML job file can
//! override any of it:
//!
//! ```yaml
//! input_dir: exports
//! output_dir: sql
//! numeric_policy: reject
//! tables:
//!   - variant: heart_rate
//!     input: heart_rate_data.csv
//!     output: heart_rate_inserts.sql
//! ```

use std::{
    collections::HashSet,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    cli::GenerateArgs,
    jsonb::JSONB_UPDATES_FILE,
    normalize::{NormalizeOptions, NumericPolicy},
    variant::Variant,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TableJob {
    pub variant: Variant,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl TableJob {
    pub fn standard(variant: Variant) -> Self {
        Self {
            variant,
            input: PathBuf::from(variant.default_input()),
            output: PathBuf::from(variant.default_output()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// `CREATE TABLE` script consulted for optional columns.
    pub schema_file: PathBuf,
    /// Qualifier placed in front of every table name; empty for none.
    pub table_schema: String,
    pub jsonb_updates: PathBuf,
    pub numeric_policy: NumericPolicy,
    pub escape_text_quotes: bool,
    pub input_encoding: Option<String>,
    pub tables: Vec<TableJob>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("sql_inserts"),
            schema_file: PathBuf::from("database.sql"),
            table_schema: "public".to_string(),
            jsonb_updates: PathBuf::from(JSONB_UPDATES_FILE),
            numeric_policy: NumericPolicy::default(),
            escape_text_quotes: false,
            input_encoding: None,
            tables: Variant::ALL.iter().copied().map(TableJob::standard).collect(),
        }
    }
}

impl BatchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: BatchConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config file {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.tables.is_empty(), "Config must list at least one table");
        let mut outputs = HashSet::new();
        for job in &self.tables {
            ensure!(
                outputs.insert(&job.output),
                "Output {:?} is assigned to more than one table",
                job.output
            );
            ensure!(
                job.output != self.jsonb_updates,
                "Output {:?} collides with the JSONB update script",
                job.output
            );
        }
        Ok(())
    }

    /// Applies command-line overrides on top of the file or defaults.
    pub fn apply_args(&mut self, args: &GenerateArgs) {
        if let Some(dir) = &args.input_dir {
            self.input_dir = dir.clone();
        }
        if let Some(dir) = &args.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(path) = &args.schema_file {
            self.schema_file = path.clone();
        }
        if let Some(schema) = &args.table_schema {
            self.table_schema = schema.trim().to_string();
        }
        if let Some(policy) = args.numeric_policy {
            self.numeric_policy = policy;
        }
        if args.escape_text_quotes {
            self.escape_text_quotes = true;
        }
        if let Some(label) = &args.input_encoding {
            self.input_encoding = Some(label.clone());
        }
    }

    pub fn input_path(&self, job: &TableJob) -> PathBuf {
        self.input_dir.join(&job.input)
    }

    pub fn output_path(&self, job: &TableJob) -> PathBuf {
        self.output_dir.join(&job.output)
    }

    pub fn jsonb_path(&self) -> PathBuf {
        self.output_dir.join(&self.jsonb_updates)
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            numeric: self.numeric_policy,
            escape_text_quotes: self.escape_text_quotes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_cover_all_seven_exports() {
        let config = BatchConfig::default();
        assert_eq!(config.tables.len(), 7);
        assert_eq!(
            config.output_path(&config.tables[2]),
            PathBuf::from("sql_inserts").join("activity_inserts.sql")
        );
        assert_eq!(
            config.input_path(&config.tables[2]),
            PathBuf::from(".").join("daily_data.csv")
        );
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn yaml_overrides_keep_unset_defaults() {
        let mut file = NamedTempFile::new().expect("temp config");
        writeln!(
            file,
            "output_dir: out\nnumeric_policy: reject\ntables:\n  - variant: spo2\n    input: spo2.csv\n    output: spo2.sql"
        )
        .expect("write config");
        let config = BatchConfig::load(file.path()).expect("load config");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.numeric_policy, NumericPolicy::Reject);
        assert_eq!(config.table_schema, "public");
        assert_eq!(config.tables.len(), 1);
        assert_eq!(config.tables[0].variant, Variant::Spo2);
    }

    #[test]
    fn unknown_keys_and_duplicate_outputs_are_rejected() {
        let mut unknown = NamedTempFile::new().expect("temp config");
        writeln!(unknown, "output_directory: out").expect("write config");
        assert!(BatchConfig::load(unknown.path()).is_err());

        let mut config = BatchConfig::default();
        config.tables[1].output = config.tables[0].output.clone();
        assert!(config.validate().is_err());
    }
}
