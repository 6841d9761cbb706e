//! Scenario grid: daily loads × trauma fractions, staffed from a lookup table.
//!
//! An empty axis falls back to the base scenario's value, so a default
//! [SweepSpace] generates exactly the base scenario.

use clinic_core::scenario::StaffingPlan;
use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::error::ExperimentError;

/// Staffing used at one daily load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaffingEntry {
    pub load: u32,
    pub staffing: StaffingPlan,
}

/// Maps a daily patient load to the staffing plan for it.
///
/// A load without an exact entry uses the entry for the next higher load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffingTable(Vec<StaffingEntry>);

impl Default for StaffingTable {
    /// Baseline plans for light, medium and heavy days.
    fn default() -> Self {
        Self::empty()
            .with_entry(75, StaffingPlan::new([2, 2, 3, 2, 3]))
            .with_entry(150, StaffingPlan::new([3, 4, 6, 3, 5]))
            .with_entry(225, StaffingPlan::new([4, 6, 9, 4, 8]))
    }
}

impl StaffingTable {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Adds or replaces the plan for `load`.
    pub fn with_entry(mut self, load: u32, staffing: StaffingPlan) -> Self {
        self.0.retain(|entry| entry.load != load);
        self.0.push(StaffingEntry { load, staffing });
        self.0.sort_by_key(|entry| entry.load);
        self
    }

    pub fn entries(&self) -> &[StaffingEntry] {
        &self.0
    }

    pub fn lookup(&self, load: u32) -> Option<StaffingPlan> {
        self.0
            .iter()
            .filter(|entry| entry.load >= load)
            .min_by_key(|entry| entry.load)
            .map(|entry| entry.staffing)
    }
}

/// Grid of scenario variations around a base [ScenarioConfig].
///
/// # Example
///
/// ```
/// use clinic_experiments::config::ScenarioConfig;
/// use clinic_experiments::parameters::SweepSpace;
///
/// let space = SweepSpace::grid()
///     .loads(vec![75, 150, 225])
///     .trauma_fractions(vec![0.05, 0.10]);
/// let scenarios = space.generate(&ScenarioConfig::default()).unwrap();
/// assert_eq!(scenarios.len(), 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSpace {
    /// Patients per day; empty keeps the base arrival profile and staffing.
    pub loads: Vec<u32>,
    /// Empty keeps the base trauma fraction.
    pub trauma_fractions: Vec<f64>,
    pub staffing: StaffingTable,
}

impl SweepSpace {
    pub fn grid() -> Self {
        Self::default()
    }

    pub fn loads(mut self, loads: Vec<u32>) -> Self {
        self.loads = loads;
        self
    }

    pub fn trauma_fractions(mut self, fractions: Vec<f64>) -> Self {
        self.trauma_fractions = fractions;
        self
    }

    pub fn staffing_table(mut self, table: StaffingTable) -> Self {
        self.staffing = table;
        self
    }

    /// Number of scenarios [SweepSpace::generate] yields.
    pub fn len(&self) -> usize {
        self.loads.len().max(1) * self.trauma_fractions.len().max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expands the grid, loads outermost, each scenario validated.
    ///
    /// # Errors
    ///
    /// `Config` when a load has no staffing entry or a scenario is invalid.
    pub fn generate(&self, base: &ScenarioConfig) -> Result<Vec<ScenarioConfig>, ExperimentError> {
        let loads: Vec<Option<u32>> = if self.loads.is_empty() {
            vec![None]
        } else {
            self.loads.iter().copied().map(Some).collect()
        };
        let fractions: Vec<Option<f64>> = if self.trauma_fractions.is_empty() {
            vec![None]
        } else {
            self.trauma_fractions.iter().copied().map(Some).collect()
        };

        let mut scenarios = Vec::with_capacity(self.len());
        for load in &loads {
            for fraction in &fractions {
                let mut params = base.params.clone();
                let mut label_parts = Vec::new();
                if let Some(load) = *load {
                    let staffing = self.staffing.lookup(load).ok_or_else(|| {
                        ExperimentError::config(format!("no staffing entry covers {load} patients/day"))
                    })?;
                    params = params.with_daily_load(load).with_staffing(staffing);
                    label_parts.push(format!("load={load}"));
                }
                if let Some(fraction) = *fraction {
                    params = params.with_trauma_fraction(fraction);
                    label_parts.push(format!("trauma={fraction:.2}"));
                }
                let label = if label_parts.is_empty() {
                    base.label.clone()
                } else {
                    label_parts.join(",")
                };

                let scenario = base.clone().with_params(params).with_label(label);
                scenario.validate()?;
                scenarios.push(scenario);
            }
        }
        Ok(scenarios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::distributions::ArrivalProfile;

    #[test]
    fn staffing_lookup_rounds_up_to_next_load() {
        let table = StaffingTable::default();
        assert_eq!(table.lookup(75), Some(StaffingPlan::new([2, 2, 3, 2, 3])));
        assert_eq!(table.lookup(100), Some(StaffingPlan::new([3, 4, 6, 3, 5])));
        assert_eq!(table.lookup(225), Some(StaffingPlan::new([4, 6, 9, 4, 8])));
        assert_eq!(table.lookup(300), None);
    }

    #[test]
    fn with_entry_replaces_existing_load() {
        let table = StaffingTable::default().with_entry(75, StaffingPlan::new([1, 1, 1, 1, 1]));
        assert_eq!(table.entries().len(), 3);
        assert_eq!(table.lookup(75), Some(StaffingPlan::new([1, 1, 1, 1, 1])));
    }

    #[test]
    fn grid_is_loads_outer_fractions_inner() {
        let scenarios = SweepSpace::grid()
            .loads(vec![75, 150])
            .trauma_fractions(vec![0.05, 0.20])
            .generate(&ScenarioConfig::default())
            .expect("generate");

        let axes: Vec<(ArrivalProfile, f64)> = scenarios
            .iter()
            .map(|s| (s.params.arrivals.clone(), s.params.trauma_fraction))
            .collect();
        let stationary = |patients_per_day| ArrivalProfile::Stationary { patients_per_day };
        assert_eq!(
            axes,
            vec![
                (stationary(75), 0.05),
                (stationary(75), 0.20),
                (stationary(150), 0.05),
                (stationary(150), 0.20),
            ]
        );
        assert_eq!(scenarios[2].params.staffing, StaffingPlan::new([3, 4, 6, 3, 5]));
        assert_eq!(scenarios[1].label, "load=75,trauma=0.20");
    }

    #[test]
    fn empty_axes_fall_back_to_base() {
        let base = ScenarioConfig::default().with_label("walk-in");
        let scenarios = SweepSpace::grid().generate(&base).expect("generate");
        assert_eq!(scenarios, vec![base]);
    }

    #[test]
    fn uncovered_load_is_a_config_error() {
        let result = SweepSpace::grid()
            .loads(vec![500])
            .generate(&ScenarioConfig::default());
        assert!(matches!(result, Err(ExperimentError::Config(_))));
    }

    #[test]
    fn invalid_fraction_is_rejected_at_generation() {
        let result = SweepSpace::grid()
            .trauma_fractions(vec![1.5])
            .generate(&ScenarioConfig::default());
        assert!(matches!(result, Err(ExperimentError::Config(_))));
    }
}
