//! Tempo Trace
//!
//! Measurement aggregation engine for empirical time-complexity analysis.
//!
//! Instrumented methods emit entry/exit events from many threads; the
//! [`AsyncRecorder`] serializes them through one mailbox and a single
//! writer into a [`MeasurementTree`] of per-call-path duration samples.
//! Trees from independent runs merge into one dataset, and
//! [`cleaner::clean`] strips statistical outliers (warm-up, GC pauses,
//! scheduler jitter) before the tree is handed to a downstream
//! curve-fitting stage.
//!
//! ```no_run
//! use tempo_trace::{clean, AsyncRecorder, ContextId, MethodAction};
//!
//! # fn main() -> Result<(), tempo_trace::utils::error::RecorderError> {
//! let recorder = AsyncRecorder::new();
//! recorder.start()?;
//!
//! let ctx = ContextId::new(1);
//! recorder.record(ctx, MethodAction::started("app.Workload.run", 1_000))?;
//! recorder.record(ctx, MethodAction::finished("app.Workload.run", 5_000))?;
//!
//! recorder.stop()?;
//! let cleaned = clean(&recorder.finished_tree()?, 20);
//! # Ok(())
//! # }
//! ```

pub mod cleaner;
pub mod output;
pub mod recorder;
pub mod tree;
pub mod utils;

pub use cleaner::clean;
pub use output::{build_report, report_to_string, TreeReport};
pub use recorder::{AsyncRecorder, ContextId, MethodAction, TimeRecorder};
pub use tree::{MeasurementTree, Measurement, Mergeable, MergeableCollection, MergeableNode};
