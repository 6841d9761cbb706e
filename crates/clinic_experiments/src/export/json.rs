use std::io::Write;

use crate::error::ExperimentError;
use crate::metrics::ScenarioResult;

pub(crate) fn write_json<W: Write>(results: &[ScenarioResult], writer: W) -> Result<(), ExperimentError> {
    serde_json::to_writer_pretty(writer, results)?;
    Ok(())
}
