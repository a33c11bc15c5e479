//! Result files: `results.json` and `results.csv`.

use crate::error::HuntError;
use crate::types::DomainResult;
use std::fmt::Write as _;
use std::path::Path;

pub const RESULTS_JSON: &str = "results.json";
pub const RESULTS_CSV: &str = "results.csv";

const CSV_HEADER: &str = "domain,available,indexed,archived_page_count,notes";

/// Render results as a pretty JSON array.
pub fn results_to_json(results: &[DomainResult]) -> Result<String, HuntError> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Render results as CSV with a header row.
///
/// Tri-states render as `true`/`false`/`unknown`.
pub fn results_to_csv(results: &[DomainResult]) -> String {
    let mut out = String::with_capacity(64 * (results.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for result in results {
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            csv_field(&result.domain),
            result.available,
            result.indexed,
            result.archived_page_count,
            csv_field(&result.notes)
        );
    }
    out
}

/// Write `results.json` into `out_dir`, returning the path written.
pub async fn write_json_results(
    out_dir: &Path,
    results: &[DomainResult],
) -> Result<std::path::PathBuf, HuntError> {
    let path = out_dir.join(RESULTS_JSON);
    write_file(&path, results_to_json(results)?).await?;
    Ok(path)
}

/// Write `results.csv` into `out_dir`, returning the path written.
pub async fn write_csv_results(
    out_dir: &Path,
    results: &[DomainResult],
) -> Result<std::path::PathBuf, HuntError> {
    let path = out_dir.join(RESULTS_CSV);
    write_file(&path, results_to_csv(results)).await?;
    Ok(path)
}

async fn write_file(path: &Path, content: String) -> Result<(), HuntError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            HuntError::file_error(
                parent.to_string_lossy(),
                format!("Failed to create output directory: {}", e),
            )
        })?;
    }
    tokio::fs::write(path, content).await.map_err(|e| {
        HuntError::file_error(path.to_string_lossy(), format!("Failed to write: {}", e))
    })
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Availability, Indexation};

    fn sample() -> Vec<DomainResult> {
        let mut taken = DomainResult::new("taken.example");
        taken.available = Availability::Unavailable;

        let mut archived = DomainResult::new("old.example");
        archived.available = Availability::Available;
        archived.indexed = Indexation::Indexed;
        archived.archived_page_count = 2;
        archived.append_note("Wayback error: disk full, \"retry\"");

        vec![taken, archived]
    }

    #[test]
    fn test_csv_layout_and_escaping() {
        let csv = results_to_csv(&sample());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "domain,available,indexed,archived_page_count,notes");
        assert_eq!(lines[1], "taken.example,false,unknown,0,");
        assert_eq!(
            lines[2],
            "old.example,true,true,2,\"Wayback error: disk full, \"\"retry\"\"\""
        );
    }

    #[test]
    fn test_json_tri_states() {
        let json = results_to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["available"], serde_json::json!(false));
        assert_eq!(value[0]["indexed"], serde_json::Value::Null);
        assert_eq!(value[1]["indexed"], serde_json::json!(true));
        assert_eq!(value[1]["archived_page_count"], serde_json::json!(2));
    }

    #[tokio::test]
    async fn test_write_results_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");

        let json_path = write_json_results(&out, &sample()).await.unwrap();
        let csv_path = write_csv_results(&out, &sample()).await.unwrap();

        assert!(json_path.ends_with(RESULTS_JSON));
        let csv = std::fs::read_to_string(csv_path).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
