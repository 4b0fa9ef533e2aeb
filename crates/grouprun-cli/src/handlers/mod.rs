//! Subcommand handlers.
//!
//! Each handler takes the shared [`CliConfig`](crate::CliConfig) plus its own
//! arguments and returns the process exit code or a report to print.

pub mod run;
pub mod sweep;
pub mod watchdog;

use grouprun_runtime::SweepReport;

/// One-line human summary of a sweep.
pub fn format_report(report: &SweepReport) -> String {
    format!(
        "signalled {} orphaned group(s), removed {} entr{}, {} still owned",
        report.signalled,
        report.removed,
        if report.removed == 1 { "y" } else { "ies" },
        report.skipped
    )
}
