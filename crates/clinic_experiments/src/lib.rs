//! Scenario experiments for the clinic patient-flow simulation.
//!
//! This crate replicates clinic scenarios in parallel, turns replication
//! summaries into confidence intervals, judges each station against its
//! service level, and searches for lean staffing plans.
//!
//! # Quick Start
//!
//! ```no_run
//! use clinic_experiments::{run_sweep, ScenarioConfig, SweepSpace};
//!
//! // Light, medium and heavy days at two trauma mixes, 30 replications each
//! let scenarios = SweepSpace::grid()
//!     .loads(vec![75, 150, 225])
//!     .trauma_fractions(vec![0.10, 0.12])
//!     .generate(&ScenarioConfig::default())
//!     .unwrap();
//!
//! let results = run_sweep(&scenarios, None).unwrap();
//! for result in &results {
//!     println!("{}: all levels met = {}", result.label, result.all_pass);
//! }
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Scenario and sweep configuration, TOML loading
//! - [`parameters`]: Load × trauma-fraction grid and staffing lookup
//! - [`runner`]: Parallel replications with rayon, progress and abort
//! - [`confidence`]: Student-t confidence intervals
//! - [`service_levels`]: Wait thresholds and verdicts
//! - [`metrics`]: Scenario aggregation
//! - [`optimizer`]: Greedy staffing reduction
//! - [`arrival_profile`]: Hourly rates from historical counts
//! - [`export`]: JSON and CSV export

pub mod arrival_profile;
pub mod confidence;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod optimizer;
pub mod parameters;
pub mod runner;
pub mod service_levels;

pub use arrival_profile::load_hourly_rates;
pub use confidence::{t_quantile, Estimate};
pub use config::{FailurePolicy, ScenarioConfig, SweepConfig};
pub use error::ExperimentError;
pub use export::{export_to_csv, export_to_json, find_cheapest_passing_index};
pub use metrics::{ScenarioResult, ScenarioStatus, StationResult};
pub use optimizer::{optimize_staffing, OptimizationOutcome, OptimizerOptions};
pub use parameters::{StaffingTable, SweepSpace};
pub use runner::{run_scenario, run_sweep, run_sweep_with_progress, SweepControl};
pub use service_levels::{ServiceLevelThresholds, ServiceLevelVerdict, VerdictBasis};
