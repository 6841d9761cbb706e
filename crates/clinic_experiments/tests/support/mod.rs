#![allow(dead_code)]

use std::io::Write;

use clinic_core::scenario::{ClinicParams, StaffingPlan};
use clinic_core::test_helpers::TEST_SEED;
use clinic_experiments::parameters::StaffingTable;
use clinic_experiments::ScenarioConfig;
use tempfile::NamedTempFile;

/// Scenario at `load` patients/day with the baseline staffing for that load.
pub fn baseline_scenario(load: u32, replications: u32) -> ScenarioConfig {
    let staffing = StaffingTable::default()
        .lookup(load)
        .unwrap_or_else(StaffingPlan::default);
    ScenarioConfig::new(
        ClinicParams::default()
            .with_daily_load(load)
            .with_staffing(staffing)
            .with_seed(TEST_SEED),
    )
    .with_label(format!("load={load}"))
    .with_replications(replications)
}

/// Writes `text` to a fresh temporary file.
pub fn temp_file_with(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(text.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Historical counts CSV: header plus one row per day.
pub fn history_csv(days: &[[u32; 18]]) -> String {
    let header: Vec<String> = (0..18).map(|hour| format!("hour_{hour}")).collect();
    let mut text = header.join(",");
    text.push('\n');
    for day in days {
        let cells: Vec<String> = day.iter().map(u32::to_string).collect();
        text.push_str(&cells.join(","));
        text.push('\n');
    }
    text
}
