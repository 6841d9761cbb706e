mod support;

use clinic_core::scenario::StaffingPlan;
use clinic_experiments::parameters::StaffingTable;
use clinic_experiments::{ExperimentError, FailurePolicy, SweepConfig};

use support::temp_file_with;

#[test]
fn bundled_sweep_config_matches_baseline_staffing() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/sweep.toml");
    let config = SweepConfig::from_toml_file(path).expect("bundled config");

    assert!(config.show_progress);
    assert_eq!(config.num_threads, None);
    assert_eq!(config.base.failure_policy, FailurePolicy::AbortScenario);
    assert_eq!(config.space.staffing, StaffingTable::default());

    let scenarios = config.scenarios().expect("scenarios");
    assert_eq!(scenarios.len(), 6);
    assert_eq!(scenarios[5].label, "load=225,trauma=0.12");
    assert_eq!(scenarios[5].params.staffing, StaffingPlan::new([4, 6, 9, 4, 8]));
}

#[test]
fn invalid_values_in_file_fail_at_generation() {
    let file = temp_file_with("[space]\nloads = [75]\ntrauma_fractions = [2.0]\n");
    let config = SweepConfig::from_toml_file(file.path()).expect("parses");
    assert!(matches!(config.scenarios(), Err(ExperimentError::Config(_))));
}
