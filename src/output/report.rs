//! In-memory report snapshot of a finished measurement tree.
//!
//! The schema is versioned to allow future evolution. The crate never
//! writes the report anywhere; callers get a JSON string and decide what
//! to do with it.

use crate::tree::{Measurement, MeasurementTree, MergeableCollection};
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::ReportError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Top-level report structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Number of nodes in the tree, root included
    pub node_count: usize,

    /// Number of samples across all nodes
    pub sample_count: usize,

    /// Recursive per-call-site breakdown
    pub root: ReportNode,
}

/// One call site in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportNode {
    /// Qualified call-site name
    pub name: String,

    /// Sample summary (absent for dataless interior nodes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<SampleSummary>,

    /// Child call sites, sorted by name for deterministic output
    pub children: Vec<ReportNode>,
}

/// Summary statistics over one node's duration samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSummary {
    pub count: usize,
    pub total_nanos: f64,
    pub mean_nanos: f64,
    pub min_nanos: f64,
    pub max_nanos: f64,
}

/// Build a report from a finished (typically cleaned) tree
///
/// **Public** - main entry point for report generation
pub fn build_report(tree: &MeasurementTree) -> TreeReport {
    debug!(
        "building report: {} nodes, {} samples",
        tree.count_nodes(),
        tree.total_samples()
    );

    TreeReport {
        version: SCHEMA_VERSION.to_string(),
        node_count: tree.count_nodes(),
        sample_count: tree.total_samples(),
        root: build_node(tree),
    }
}

/// Render a report as pretty-printed JSON
///
/// # Errors
/// * `ReportError::SerializationFailed` - JSON serialization error
pub fn report_to_string(report: &TreeReport) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn build_node(node: &MeasurementTree) -> ReportNode {
    let mut children: Vec<ReportNode> = node.children().map(build_node).collect();
    children.sort_by(|a, b| a.name.cmp(&b.name));

    ReportNode {
        name: node.name().to_string(),
        samples: node.data().and_then(summarize),
        children,
    }
}

fn summarize(collection: &MergeableCollection<Measurement>) -> Option<SampleSummary> {
    if collection.is_empty() {
        return None;
    }

    let totals: Vec<f64> = collection.iter().map(Measurement::total).collect();
    let total: f64 = totals.iter().sum();

    Some(SampleSummary {
        count: totals.len(),
        total_nanos: total,
        mean_nanos: total / totals.len() as f64,
        min_nanos: totals.iter().copied().fold(f64::INFINITY, f64::min),
        max_nanos: totals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}
