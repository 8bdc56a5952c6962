//! Report output for finished measurement trees.

pub mod report;

pub use report::{build_report, report_to_string, ReportNode, SampleSummary, TreeReport};
