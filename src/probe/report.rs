use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{LaunchResult, ProbeResult};

/// File name of the JSON run report
pub const REPORT_FILENAME: &str = "launch_report.json";

/// Generate a timestamp string in YYYYMMDD_HHMMSS format
pub fn generate_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Generate a filename for evidence images
pub fn generate_filename(prefix: &str, timestamp: &str) -> String {
    format!("{}_{}.png", prefix, timestamp)
}

/// Write the JSON report for a finished run into `dir`, returning its path
pub fn write_report(result: &LaunchResult, dir: &Path) -> ProbeResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILENAME);
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    fs::write(&path, json)?;
    Ok(path)
}
