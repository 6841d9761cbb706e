use std::io::Write;

use clinic_core::station::StationKind;
use serde::Serialize;

use crate::error::ExperimentError;
use crate::metrics::{ScenarioResult, ScenarioStatus};
use crate::service_levels::ServiceLevelVerdict;

#[derive(Serialize)]
struct StationRow<'a> {
    label: &'a str,
    patients_per_day: Option<u32>,
    trauma_fraction: f64,
    staffing: String,
    status: ScenarioStatus,
    replications_used: usize,
    replications_failed: usize,
    all_pass: bool,
    mean_time_in_system: f64,
    time_in_system_half_width: f64,
    station: StationKind,
    capacity: u32,
    wait_samples: usize,
    mean_wait: f64,
    wait_half_width: f64,
    wait_lower: f64,
    wait_upper: f64,
    max_wait: f64,
    wait_limit: f64,
    mean_utilization: f64,
    mean_queue_length: f64,
    max_queue_length: usize,
    verdict: ServiceLevelVerdict,
}

pub(crate) fn write_csv<W: Write>(results: &[ScenarioResult], writer: W) -> Result<(), ExperimentError> {
    let mut wtr = csv::Writer::from_writer(writer);

    for result in results {
        let staffing = result.staffing.to_string();
        for station in &result.stations {
            wtr.serialize(StationRow {
                label: &result.label,
                patients_per_day: result.patients_per_day(),
                trauma_fraction: result.trauma_fraction,
                staffing: staffing.clone(),
                status: result.status,
                replications_used: result.replications_used,
                replications_failed: result.replications_failed(),
                all_pass: result.all_pass,
                mean_time_in_system: result.time_in_system.mean,
                time_in_system_half_width: result.time_in_system.half_width,
                station: station.station,
                capacity: station.capacity,
                wait_samples: station.wait.n,
                mean_wait: station.wait.mean,
                wait_half_width: station.wait.half_width,
                wait_lower: station.wait.lower,
                wait_upper: station.wait.upper,
                max_wait: station.max_wait_minutes,
                wait_limit: station.threshold.limit_minutes,
                mean_utilization: station.utilization.mean,
                mean_queue_length: station.avg_queue_length.mean,
                max_queue_length: station.max_queue_length,
                verdict: station.verdict,
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}
