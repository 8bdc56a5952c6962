//! Recorder backend seam.
//!
//! Instrumentation code talks to this trait so alternative backends (e.g.
//! a synchronous in-memory recorder for tests) can be swapped in without
//! touching the call sites.

use crate::recorder::event::{ContextId, MethodAction};
use crate::utils::error::RecorderError;

/// Lifecycle and ingestion contract every recorder backend fulfils
pub trait TimeRecorder {
    /// Begin accepting events; allocates whatever the backend needs
    fn start(&self) -> Result<(), RecorderError>;

    /// Submit one entry/exit event for a context. Safe to call from any
    /// producer concurrently once started.
    fn record(&self, context: ContextId, action: MethodAction) -> Result<(), RecorderError>;

    /// Stop accepting events, drain everything already accepted, and
    /// become terminal. Stopping twice is a no-op.
    fn stop(&self) -> Result<(), RecorderError>;
}
