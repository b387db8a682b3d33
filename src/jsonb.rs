//! Closing script that promotes JSON text columns to `jsonb`.

use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{io_utils, statement::qualified_table, variant::Variant};

pub const JSONB_UPDATES_FILE: &str = "jsonb_updates.sql";

struct JsonbColumn {
    variant: Variant,
    column: &'static str,
    /// Also skip rows holding the literal text `NULL`.
    skip_null_text: bool,
}

const JSONB_COLUMNS: &[JsonbColumn] = &[
    JsonbColumn {
        variant: Variant::Sleep,
        column: "contributors",
        skip_null_text: false,
    },
    JsonbColumn {
        variant: Variant::Readiness,
        column: "contributors",
        skip_null_text: false,
    },
    JsonbColumn {
        variant: Variant::Spo2,
        column: "spo2_percentage",
        skip_null_text: true,
    },
];

/// The fixed `UPDATE ... ::jsonb` script.
pub fn jsonb_update_script(table_schema: &str) -> String {
    let mut script = String::from("-- Convert text fields to JSONB format\n");
    for entry in JSONB_COLUMNS {
        let table = qualified_table(table_schema, entry.variant.table_name());
        let column = entry.column;
        script.push_str(&format!(
            "UPDATE {table} SET {column} = {column}::jsonb WHERE {column} IS NOT NULL"
        ));
        if entry.skip_null_text {
            script.push_str(&format!(" AND {column} != 'NULL'"));
        }
        script.push_str(";\n");
    }
    script
}

pub fn write_jsonb_updates(path: &Path, table_schema: &str) -> Result<()> {
    let mut writer = io_utils::create_output(path)?;
    writer
        .write_all(jsonb_update_script(table_schema).as_bytes())
        .and_then(|_| writer.flush())
        .with_context(|| format!("Writing JSONB updates to {path:?}"))?;
    info!("JSONB update statements generated in {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_holds_three_updates() {
        let script = jsonb_update_script("public");
        let updates = script
            .lines()
            .filter(|line| line.starts_with("UPDATE"))
            .collect::<Vec<_>>();
        assert_eq!(
            updates,
            vec![
                "UPDATE public.oura_sleep SET contributors = contributors::jsonb WHERE contributors IS NOT NULL;",
                "UPDATE public.oura_readiness SET contributors = contributors::jsonb WHERE contributors IS NOT NULL;",
                "UPDATE public.oura_spo2 SET spo2_percentage = spo2_percentage::jsonb WHERE spo2_percentage IS NOT NULL AND spo2_percentage != 'NULL';",
            ]
        );
    }
}
