//! JSON output of the aggregation report.
//!
//! The report is written once per run to a single well-known file
//! (`jobs-data.json` next to the process by default). Readers must never see
//! a half-written document, so the JSON goes to a temporary sibling file
//! first and is then renamed over the target.

use crate::models::AggregationReport;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

pub const DEFAULT_OUTPUT_PATH: &str = "jobs-data.json";

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `report` as pretty JSON and atomically replace `output_path`.
#[instrument(level = "info", skip_all, fields(%output_path))]
pub async fn write_report(
    report: &AggregationReport,
    output_path: &str,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;
    let path = Path::new(output_path);
    let tmp = temp_path(path);

    fs::write(&tmp, json.as_bytes()).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        error!(tmp = %tmp.display(), error = %e, "Failed to move report into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    info!(
        path = %output_path,
        jobs = report.total_count,
        bytes = json.len(),
        "Wrote job report"
    );
    Ok(())
}
