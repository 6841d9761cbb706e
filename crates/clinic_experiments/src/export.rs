//! Result export and ranking.
//!
//! JSON keeps the full [ScenarioResult] structure; CSV flattens it to one row
//! per scenario and station.

use std::fs::File;
use std::path::Path;

use crate::error::ExperimentError;
use crate::metrics::ScenarioResult;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/ranking.rs"]
mod ranking;

/// Export scenario results to a pretty-printed JSON array.
///
/// # Errors
///
/// `Config` for an empty slice; `Io` or `Json` when the file cannot be written.
pub fn export_to_json(
    results: &[ScenarioResult],
    path: impl AsRef<Path>,
) -> Result<(), ExperimentError> {
    let file = open_export(results, path)?;
    json::write_json(results, file)
}

/// Export scenario results to CSV, one row per scenario × station.
///
/// Scenario-level columns (label, load, staffing, status, time in system)
/// repeat on each of a scenario's five rows.
///
/// # Errors
///
/// `Config` for an empty slice; `Io` or `Csv` when the file cannot be written.
pub fn export_to_csv(
    results: &[ScenarioResult],
    path: impl AsRef<Path>,
) -> Result<(), ExperimentError> {
    let file = open_export(results, path)?;
    csv::write_csv(results, file)
}

/// Index of the passing scenario with the fewest servers.
///
/// Ties go to the lower mean time in system, then to the earlier scenario.
pub fn find_cheapest_passing_index(results: &[ScenarioResult]) -> Option<usize> {
    ranking::cheapest_passing_index(results)
}

/// Creates the output file once there is something to write into it.
fn open_export(results: &[ScenarioResult], path: impl AsRef<Path>) -> Result<File, ExperimentError> {
    if results.is_empty() {
        return Err(ExperimentError::config("no results to export"));
    }
    Ok(File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::runner::run_scenario;
    use clinic_core::scenario::{ClinicParams, StaffingPlan};
    use tempfile::NamedTempFile;

    fn results() -> Vec<ScenarioResult> {
        [("light", 40, [2, 2, 3, 2, 3]), ("lean", 40, [1, 1, 2, 1, 2])]
            .into_iter()
            .map(|(label, load, staffing)| {
                let config = ScenarioConfig::new(
                    ClinicParams::default()
                        .with_daily_load(load)
                        .with_staffing(StaffingPlan::new(staffing)),
                )
                .with_label(label)
                .with_replications(3);
                run_scenario(&config).expect("scenario")
            })
            .collect()
    }

    #[test]
    fn json_export_keeps_structure() {
        let results = results();
        let file = NamedTempFile::new().expect("temp file");
        export_to_json(&results, file.path()).expect("export");

        let contents = std::fs::read_to_string(file.path()).expect("read");
        let parsed: serde_json::Value = serde_json::from_str(&contents).expect("valid json");
        let scenarios = parsed.as_array().expect("array");
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0]["label"], "light");
        assert_eq!(scenarios[1]["staffing"]["examination"], 2);
        assert_eq!(scenarios[0]["stations"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn csv_export_has_a_row_per_station() {
        let results = results();
        let file = NamedTempFile::new().expect("temp file");
        export_to_csv(&results, file.path()).expect("export");

        let mut reader = ::csv::Reader::from_path(file.path()).expect("reader");
        let headers = reader.headers().expect("headers").clone();
        assert_eq!(&headers[0], "label");
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().expect("rows");
        assert_eq!(rows.len(), 10);

        let station_column = headers
            .iter()
            .position(|name| name == "station")
            .expect("station column");
        assert_eq!(&rows[0][station_column], "triage");
        assert_eq!(&rows[9][station_column], "treatment");
        assert_eq!(&rows[9][0], "lean");
    }

    #[test]
    fn empty_results_are_rejected() {
        let file = NamedTempFile::new().expect("temp file");
        assert!(matches!(
            export_to_json(&[], file.path()),
            Err(ExperimentError::Config(_))
        ));
        assert!(matches!(
            export_to_csv(&[], file.path()),
            Err(ExperimentError::Config(_))
        ));
    }

    #[test]
    fn cheapest_passing_prefers_fewer_servers() {
        let mut results = results();
        results[0].all_pass = true;
        results[1].all_pass = true;
        assert_eq!(find_cheapest_passing_index(&results), Some(1));

        results[1].all_pass = false;
        assert_eq!(find_cheapest_passing_index(&results), Some(0));

        results[0].all_pass = false;
        assert_eq!(find_cheapest_passing_index(&results), None);
    }
}
