use std::cmp::Ordering;

use crate::metrics::ScenarioResult;

pub(crate) fn cheapest_passing_index(results: &[ScenarioResult]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .filter(|(_, result)| result.all_pass)
        .min_by(|(a_index, a), (b_index, b)| {
            a.staffing
                .total_servers()
                .cmp(&b.staffing.total_servers())
                .then_with(|| {
                    a.time_in_system
                        .mean
                        .partial_cmp(&b.time_in_system.mean)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a_index.cmp(b_index))
        })
        .map(|(index, _)| index)
}
