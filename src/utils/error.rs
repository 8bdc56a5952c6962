//! Error types for the entire crate.
//!
//! We use `thiserror` for library-style errors with custom types.
//! Statistical edge cases in the cleaner are resolved deterministically
//! and never surface here (see `cleaner::esd`).

use crate::recorder::event::ContextId;
use thiserror::Error;

/// Errors that can occur while operating the recorder
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("recorder has not been started")]
    NotStarted,

    #[error("recorder is already started")]
    AlreadyStarted,

    #[error("recorder is stopped and no longer accepts events")]
    AlreadyStopped,

    #[error("recorder mailbox is full ({capacity} events); writer is falling behind")]
    QueueFull { capacity: usize },

    #[error("recorder is still running; the tree is readable only after stop()")]
    StillRunning,

    #[error("recorder worker thread disappeared unexpectedly")]
    WorkerGone,

    #[error("recorder worker thread panicked while draining")]
    WorkerPanicked,

    #[error("failed to spawn recorder worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Protocol violations detected by the per-context call-stack tracker.
///
/// These indicate malformed event order from the instrumentation side.
/// They are scoped to one context and never abort the recorder.
#[derive(Error, Debug)]
pub enum StackError {
    #[error("context {context}: finished '{finished}' but no call is open")]
    EmptyStack { context: ContextId, finished: String },

    #[error("context {context}: finished '{finished}' but innermost open call is '{open}'")]
    UnbalancedFinish {
        context: ContextId,
        finished: String,
        open: String,
    },
}

/// Errors that can occur while rendering a tree report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
