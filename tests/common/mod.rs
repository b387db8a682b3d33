#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory holding CSV exports and generated scripts.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` under the workspace, creating parent directories.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.temp_dir.path().join(name)).expect("read workspace file")
    }
}

pub const SLEEP_CSV: &str = ",id,contributors,day,score,timestamp\n\
0,abc123,{'total': 90},2024-01-01,85,2024-01-01T07:00:00\n\
1,abc124,{'total': 75},2024-01-02,,2024-01-02T07:10:00\n";

pub const HEART_RATE_CSV: &str = "index,bpm,source,timestamp\n\
0,62,awake,2024-01-01T00:00:00\n\
1,58,rest,2024-01-01T00:05:00\n";

pub const ACTIVITY_CSV: &str = ",id,day,score,active_calories,steps,calories\n\
0,act1,2024-01-01,80,350,9000,2400\n";

pub const READINESS_CSV: &str = ",id,contributors,day,score\n\
0,r1,{'hrv_balance': 70},2024-01-01,78\n";

/// Inserts lines of a generated script, ignoring blank lines.
pub fn statements(script: &str) -> Vec<&str> {
    script.lines().filter(|line| !line.trim().is_empty()).collect()
}
