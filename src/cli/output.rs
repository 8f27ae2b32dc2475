//! Report output on stdout.

use std::io::Write;

use anyhow::Result;
use spkstate::report::StateReport;

use super::args::OutputFormat;

/// Write the report to stdout in the requested format.
pub fn write_report(report: &StateReport, format: OutputFormat) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Text => writeln!(stdout, "{report}")?,
        OutputFormat::Json => writeln!(stdout, "{}", report.to_json()?)?,
    }
    stdout.flush()?;
    Ok(())
}
