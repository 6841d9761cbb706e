mod support;

use clinic_core::scenario::ClinicParams;
use clinic_core::station::StationKind;
use clinic_experiments::runner::run_sweep_with_progress;
use clinic_experiments::{
    run_scenario, ScenarioConfig, ScenarioStatus, ServiceLevelVerdict, SweepControl, SweepSpace, VerdictBasis,
};

use support::baseline_scenario;

#[test]
fn light_day_triage_meets_its_service_level() {
    let result = run_scenario(&baseline_scenario(75, 30)).expect("scenario");

    assert_eq!(result.status, ScenarioStatus::Complete);
    assert_eq!(result.replications_used, 30);
    let triage = result.station(StationKind::Triage).expect("triage");
    assert_eq!(triage.wait.n, 30);
    assert!(triage.wait.upper < 2.0, "triage upper bound {}", triage.wait.upper);
    assert_eq!(triage.verdict, ServiceLevelVerdict::Pass);
    assert!((result.arrivals.mean - 75.0).abs() < 5.0);
    assert_eq!(result.arrivals.mean, result.discharged.mean);
}

#[test]
fn quiet_stations_keep_one_wait_sample_per_replication() {
    let config = ScenarioConfig::new(ClinicParams::default().with_daily_load(4).with_seed(1))
        .with_replications(6);
    let result = run_scenario(&config).expect("scenario");

    assert_eq!(result.replications_used, 6);
    for station in &result.stations {
        assert_eq!(station.wait.n, 6, "{} wait samples", station.station);
        assert!(station.wait.upper.is_finite());
    }
    let trauma = result.station(StationKind::Trauma).expect("trauma");
    assert_eq!(trauma.verdict, ServiceLevelVerdict::Pass);
}

#[test]
fn more_replications_narrow_the_interval() {
    let thirty = run_scenario(&baseline_scenario(75, 30)).expect("30 replications");
    let sixty = run_scenario(&baseline_scenario(75, 60)).expect("60 replications");

    assert!(
        sixty.time_in_system.half_width < thirty.time_in_system.half_width,
        "{} vs {}",
        sixty.time_in_system.half_width,
        thirty.time_in_system.half_width
    );
}

#[test]
fn results_do_not_depend_on_thread_count() {
    let scenarios = SweepSpace::grid()
        .loads(vec![75, 150])
        .generate(&baseline_scenario(75, 8))
        .expect("scenarios");

    let single = run_sweep_with_progress(&scenarios, Some(1), false, &SweepControl::new())
        .expect("single thread");
    let many = run_sweep_with_progress(&scenarios, Some(4), false, &SweepControl::new())
        .expect("four threads");
    assert_eq!(single, many);
}

#[test]
fn aborted_sweep_returns_aborted() {
    let control = SweepControl::new();
    control.abort();
    let result = run_sweep_with_progress(&[baseline_scenario(75, 4)], Some(2), false, &control);
    assert!(matches!(
        result,
        Err(clinic_experiments::ExperimentError::Aborted)
    ));
}

#[test]
fn mean_basis_is_never_stricter_than_upper_bound() {
    let upper = run_scenario(&baseline_scenario(150, 10)).expect("upper bound");
    let mean = run_scenario(&baseline_scenario(150, 10).with_verdict_basis(VerdictBasis::Mean))
        .expect("mean");

    for (strict, relaxed) in upper.stations.iter().zip(&mean.stations) {
        assert_eq!(strict.wait, relaxed.wait);
        if strict.verdict == ServiceLevelVerdict::Pass {
            assert_eq!(relaxed.verdict, ServiceLevelVerdict::Pass);
        }
    }
}

#[test]
fn shares_follow_routing_probabilities() {
    let result = run_scenario(&baseline_scenario(225, 10)).expect("scenario");
    assert!((result.trauma_share.mean - 0.10).abs() < 0.03);
    assert!((result.direct_discharge_share.mean - 0.40).abs() < 0.05);
    assert!(result.stations.iter().all(|station| station.max_queue_length as f64 >= station.avg_queue_length.mean));
}
