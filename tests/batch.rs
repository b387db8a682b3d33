mod common;

use common::{ACTIVITY_CSV, HEART_RATE_CSV, READINESS_CSV, SLEEP_CSV, TestWorkspace, statements};
use oura_inserts::batch::{TableStatus, run_batch};
use oura_inserts::config::{BatchConfig, TableJob};
use oura_inserts::schema_probe::{ColumnPresence, FixedPresence};
use oura_inserts::variant::Variant;

fn config_for(workspace: &TestWorkspace) -> BatchConfig {
    BatchConfig {
        input_dir: workspace.path().to_path_buf(),
        output_dir: workspace.path().join("sql_inserts"),
        schema_file: workspace.path().join("database.sql"),
        ..BatchConfig::default()
    }
}

#[test]
fn missing_inputs_are_skipped_and_counted() {
    let workspace = TestWorkspace::new();
    workspace.write("sleep_data.csv", SLEEP_CSV);
    workspace.write("heart_rate_data.csv", HEART_RATE_CSV);
    workspace.write("daily_data.csv", ACTIVITY_CSV);
    workspace.write("daily_readiness.csv", ",id,contributors,day,score\n");

    let config = config_for(&workspace);
    let report = run_batch(&config, &FixedPresence(ColumnPresence::Unknown)).expect("run batch");

    assert_eq!(report.successful(), 4);
    assert_eq!(report.total(), 7);
    assert_eq!(report.summary_line(), "Summary: Successfully processed 4/7 CSV files.");
    assert!(!report.is_complete());
    assert!(report.jsonb_written);

    let missing = report
        .missing()
        .map(|outcome| outcome.job.variant)
        .collect::<Vec<_>>();
    assert_eq!(missing, vec![Variant::SleepTime, Variant::Spo2, Variant::Stress]);

    for name in [
        "sleep_inserts.sql",
        "heart_rate_inserts.sql",
        "activity_inserts.sql",
        "readiness_inserts.sql",
        "jsonb_updates.sql",
    ] {
        assert!(workspace.path().join("sql_inserts").join(name).exists(), "{name}");
    }
    for name in ["sleep_time_inserts.sql", "spo2_inserts.sql", "stress_inserts.sql"] {
        assert!(!workspace.path().join("sql_inserts").join(name).exists(), "{name}");
    }
    assert!(workspace.read("sql_inserts/readiness_inserts.sql").is_empty());
    assert_eq!(statements(&workspace.read("sql_inserts/sleep_inserts.sql")).len(), 2);
    let updates = workspace.read("sql_inserts/jsonb_updates.sql");
    assert_eq!(updates.matches("::jsonb").count(), 3);
}

#[test]
fn jsonb_script_is_written_even_with_no_inputs() {
    let workspace = TestWorkspace::new();
    let config = config_for(&workspace);
    let report = run_batch(&config, &FixedPresence(ColumnPresence::Unknown)).expect("run batch");
    assert_eq!(report.successful(), 0);
    assert!(workspace.path().join("sql_inserts/jsonb_updates.sql").exists());
}

#[test]
fn rerun_overwrites_previous_scripts() {
    let workspace = TestWorkspace::new();
    workspace.write("daily_readiness.csv", READINESS_CSV);
    let mut config = config_for(&workspace);
    config.tables = vec![TableJob::standard(Variant::Readiness)];

    run_batch(&config, &FixedPresence(ColumnPresence::Unknown)).expect("first run");
    run_batch(&config, &FixedPresence(ColumnPresence::Unknown)).expect("second run");

    let script = workspace.read("sql_inserts/readiness_inserts.sql");
    assert_eq!(
        statements(&script),
        vec![
            "INSERT INTO public.oura_readiness (original_id, day, score, contributors) \
             VALUES ('r1', '2024-01-01', 78, '{\"hrv_balance\": 70}');"
        ]
    );
}

#[test]
fn unreadable_input_fails_only_its_table() {
    let workspace = TestWorkspace::new();
    std::fs::create_dir_all(workspace.path().join("sleep_data.csv")).expect("dir as input");
    workspace.write("heart_rate_data.csv", HEART_RATE_CSV);
    let mut config = config_for(&workspace);
    config.tables = vec![
        TableJob::standard(Variant::Sleep),
        TableJob::standard(Variant::HeartRate),
    ];

    let report = run_batch(&config, &FixedPresence(ColumnPresence::Absent)).expect("run batch");
    assert!(matches!(report.outcomes[0].status, TableStatus::Failed(_)));
    assert!(matches!(report.outcomes[1].status, TableStatus::Processed(_)));
    assert_eq!(report.successful(), 1);
}

#[test]
fn table_schema_override_changes_qualifier() {
    let workspace = TestWorkspace::new();
    workspace.write("heart_rate_data.csv", HEART_RATE_CSV);
    let mut config = config_for(&workspace);
    config.table_schema = String::new();
    config.tables = vec![TableJob::standard(Variant::HeartRate)];

    run_batch(&config, &FixedPresence(ColumnPresence::Absent)).expect("run batch");
    let script = workspace.read("sql_inserts/heart_rate_inserts.sql");
    assert!(statements(&script)[0].starts_with("INSERT INTO oura_heart_rate (bpm, source, timestamp)"));
    let updates = workspace.read("sql_inserts/jsonb_updates.sql");
    assert!(updates.contains("UPDATE oura_sleep SET"));
}
