use clinic_core::replication::run_replication;
use clinic_core::scenario::{ClinicParams, StaffingPlan};
use clinic_core::station::StationKind;

#[test]
fn light_day_keeps_triage_waits_under_two_minutes() {
    let params = ClinicParams::default()
        .with_daily_load(75)
        .with_trauma_fraction(0.10)
        .with_staffing(StaffingPlan::new([2, 2, 3, 2, 3]));
    let reps = 10;
    let mean_triage_wait = (0..reps)
        .map(|r| {
            let summary = run_replication(&params, r).expect("replication");
            summary
                .station(StationKind::Triage)
                .map(|s| s.mean_wait_min)
                .unwrap_or(f64::NAN)
        })
        .sum::<f64>()
        / reps as f64;
    assert!(mean_triage_wait < 2.0, "triage mean wait {mean_triage_wait}");
}

#[test]
fn heavy_day_drains_with_scaled_staffing() {
    let params = ClinicParams::default()
        .with_daily_load(225)
        .with_staffing(StaffingPlan::new([4, 6, 9, 4, 8]));
    let summary = run_replication(&params, 0).expect("replication");
    assert_eq!(summary.arrivals, summary.discharged);
    assert!(summary.duration_min >= 1080.0 * 0.9);
    for station in &summary.stations {
        assert!(station.utilization >= 0.0 && station.utilization <= 1.0);
    }
}
