//! Per-replication statistic collectors.
//!
//! [DiscreteStat] observes point samples (one wait per patient); [ContinuousStat]
//! observes a piecewise-constant signal (queue length, busy servers) and
//! integrates it over simulated time.

use serde::Serialize;

use crate::clock::ms_to_minutes;

/// Common observer capability for both collector kinds.
pub trait Collector {
    type Sample;

    fn observe(&mut self, sample: Self::Sample);

    /// Clears all state, as at the start of a replication.
    fn reset(&mut self);
}

/// Discrete-time statistic: count, sum and sum of squares of point samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscreteStat {
    count: u64,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl DiscreteStat {
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sample mean; 0 when nothing was observed.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Unbiased sample variance; 0 with fewer than two samples.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        ((self.sum_sq - self.sum * self.sum / n) / (n - 1.0)).max(0.0)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Collector for DiscreteStat {
    type Sample = f64;

    fn observe(&mut self, sample: f64) {
        if self.count == 0 {
            self.min = sample;
            self.max = sample;
        } else {
            self.min = self.min.min(sample);
            self.max = self.max.max(sample);
        }
        self.count += 1;
        self.sum += sample;
        self.sum_sq += sample * sample;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Time-weighted average over a window, with a flag for empty windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeAverage {
    pub value: f64,
    /// True when the window had zero length and `value` is a placeholder 0.
    pub degenerate: bool,
}

/// Continuous-time statistic over a piecewise-constant signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContinuousStat {
    start_ms: u64,
    last_ms: u64,
    last_value: f64,
    /// Integral of value over time, in value-minutes.
    area: f64,
    max_value: f64,
}

impl ContinuousStat {
    /// Starts observing at `start_ms` with the given initial value.
    pub fn starting_at(start_ms: u64, initial_value: f64) -> Self {
        Self {
            start_ms,
            last_ms: start_ms,
            last_value: initial_value,
            area: 0.0,
            max_value: initial_value,
        }
    }

    pub fn current(&self) -> f64 {
        self.last_value
    }

    pub fn max(&self) -> f64 {
        self.max_value
    }

    /// Time-weighted average from the start through `end_ms`.
    pub fn time_average(&self, end_ms: u64) -> TimeAverage {
        let end_ms = end_ms.max(self.last_ms);
        if end_ms <= self.start_ms {
            return TimeAverage {
                value: 0.0,
                degenerate: true,
            };
        }
        let area = self.area + self.last_value * ms_to_minutes(end_ms - self.last_ms);
        TimeAverage {
            value: area / ms_to_minutes(end_ms - self.start_ms),
            degenerate: false,
        }
    }
}

impl Collector for ContinuousStat {
    /// `(value, timestamp_ms)`: the signal takes `value` from `timestamp_ms` on.
    type Sample = (f64, u64);

    fn observe(&mut self, (value, timestamp_ms): (f64, u64)) {
        debug_assert!(timestamp_ms >= self.last_ms, "observation went back in time");
        let timestamp_ms = timestamp_ms.max(self.last_ms);
        self.area += self.last_value * ms_to_minutes(timestamp_ms - self.last_ms);
        self.last_ms = timestamp_ms;
        self.last_value = value;
        self.max_value = self.max_value.max(value);
    }

    fn reset(&mut self) {
        *self = Self::starting_at(self.start_ms, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ONE_MIN_MS;

    #[test]
    fn discrete_stat_mean_and_variance() {
        let mut stat = DiscreteStat::default();
        for sample in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stat.observe(sample);
        }
        assert_eq!(stat.count(), 8);
        assert_eq!(stat.mean(), 5.0);
        assert!((stat.variance() - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(stat.min(), 2.0);
        assert_eq!(stat.max(), 9.0);
    }

    #[test]
    fn empty_discrete_stat_reports_zero() {
        let stat = DiscreteStat::default();
        assert!(stat.is_empty());
        assert_eq!(stat.mean(), 0.0);
        assert_eq!(stat.variance(), 0.0);
    }

    #[test]
    fn continuous_stat_integrates_value_over_time() {
        let mut stat = ContinuousStat::starting_at(0, 0.0);
        stat.observe((2.0, 10 * ONE_MIN_MS));
        stat.observe((1.0, 20 * ONE_MIN_MS));
        stat.observe((0.0, 30 * ONE_MIN_MS));

        // 0 for 10 min, 2 for 10 min, 1 for 10 min, then 0 for 10 min.
        let avg = stat.time_average(40 * ONE_MIN_MS);
        assert!(!avg.degenerate);
        assert!((avg.value - 30.0 / 40.0).abs() < 1e-12);
        assert_eq!(stat.max(), 2.0);
    }

    #[test]
    fn continuous_stat_is_not_a_snapshot_average() {
        let mut stat = ContinuousStat::starting_at(0, 0.0);
        // Many brief spikes and one long plateau.
        for minute in 0..5 {
            stat.observe((10.0, minute * ONE_MIN_MS));
            stat.observe((0.0, minute * ONE_MIN_MS + 1));
        }
        stat.observe((1.0, 5 * ONE_MIN_MS));
        let avg = stat.time_average(105 * ONE_MIN_MS);
        assert!((avg.value - 100.0 / 105.0).abs() < 1e-3, "avg {}", avg.value);
    }

    #[test]
    fn zero_length_window_is_flagged() {
        let mut stat = ContinuousStat::starting_at(0, 3.0);
        stat.observe((5.0, 0));
        let avg = stat.time_average(0);
        assert!(avg.degenerate);
        assert_eq!(avg.value, 0.0);
    }

    #[test]
    fn reset_clears_both_collectors() {
        let mut discrete = DiscreteStat::default();
        discrete.observe(4.0);
        discrete.reset();
        assert!(discrete.is_empty());

        let mut continuous = ContinuousStat::starting_at(0, 0.0);
        continuous.observe((4.0, ONE_MIN_MS));
        continuous.reset();
        assert_eq!(continuous.current(), 0.0);
        assert_eq!(continuous.time_average(ONE_MIN_MS).value, 0.0);
    }
}
