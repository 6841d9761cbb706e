//! Hourly arrival rates from historical daily counts.
//!
//! The CSV has a header row and one row per day; the first 18 columns hold the
//! patients that arrived in each operating hour starting at open. Rows whose
//! first cell is empty are not days. Missing or unreadable cells count as zero
//! for that day.

use std::io::Read;
use std::path::Path;

use crate::error::ExperimentError;

/// Hourly columns read from each day.
pub const OPERATING_HOURS: usize = 18;

/// Average patients/hour for each operating hour, read from `path`.
pub fn load_hourly_rates(path: impl AsRef<Path>) -> Result<Vec<f64>, ExperimentError> {
    let file = std::fs::File::open(path)?;
    hourly_rates_from_reader(file)
}

/// Average patients/hour for each operating hour, read from CSV text.
///
/// # Errors
///
/// `Csv` for malformed input, `Config` when the file has no day rows.
pub fn hourly_rates_from_reader<R: Read>(reader: R) -> Result<Vec<f64>, ExperimentError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut totals = [0.0; OPERATING_HOURS];
    let mut days = 0usize;
    let mut skipped_cells = 0usize;
    for record in csv_reader.records() {
        let record = record?;
        if record.get(0).map_or(true, |cell| cell.trim().is_empty()) {
            continue;
        }
        days += 1;
        for (hour, total) in totals.iter_mut().enumerate() {
            match record.get(hour).map(|cell| cell.trim().parse::<f64>()) {
                Some(Ok(count)) if count.is_finite() && count >= 0.0 => *total += count,
                _ => skipped_cells += 1,
            }
        }
    }

    if days == 0 {
        return Err(ExperimentError::config("arrival history has no day rows"));
    }
    if skipped_cells > 0 {
        tracing::warn!(days, skipped_cells, "arrival history has unreadable hourly counts");
    }
    Ok(totals.iter().map(|total| total / days as f64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> String {
        (6..24)
            .map(|hour| format!("h{hour:02}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn averages_each_hour_over_days() {
        let day_one = vec!["2"; OPERATING_HOURS].join(",");
        let day_two = vec!["4"; OPERATING_HOURS].join(",");
        let text = format!("{}\n{day_one}\n{day_two}\n", header());

        let rates = hourly_rates_from_reader(text.as_bytes()).expect("rates");
        assert_eq!(rates.len(), OPERATING_HOURS);
        assert!(rates.iter().all(|&rate| rate == 3.0));
    }

    #[test]
    fn blank_rows_are_not_days() {
        let day = vec!["6"; OPERATING_HOURS].join(",");
        let text = format!("{}\n{day}\n,,,\n\n", header());
        let rates = hourly_rates_from_reader(text.as_bytes()).expect("rates");
        assert_eq!(rates[0], 6.0);
    }

    #[test]
    fn unreadable_and_missing_cells_count_as_zero() {
        let text = format!("{}\n5,x,7\n5,3,7\n", header());
        let rates = hourly_rates_from_reader(text.as_bytes()).expect("rates");
        assert_eq!(rates[0], 5.0);
        assert_eq!(rates[1], 1.5);
        assert_eq!(rates[2], 7.0);
        assert_eq!(rates[17], 0.0);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let day = vec!["1"; OPERATING_HOURS].join(",");
        let text = format!("\u{feff}{}\n{day}\n", header());
        let rates = hourly_rates_from_reader(text.as_bytes()).expect("rates");
        assert_eq!(rates[0], 1.0);
    }

    #[test]
    fn header_only_is_an_error() {
        let result = hourly_rates_from_reader(header().as_bytes());
        assert!(matches!(result, Err(ExperimentError::Config(_))));
    }
}
