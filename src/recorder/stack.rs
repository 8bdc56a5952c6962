//! Per-context call-stack tracking.
//!
//! Reconstructs call nesting from the flat event stream: one LIFO stack of
//! open frames per context, pushed on entry and popped on exit. The path
//! from stack bottom to top at any instant is the ancestry used to address
//! the tree node that receives the resulting measurement.

use crate::recorder::event::ContextId;
use crate::tree::Measurement;
use crate::utils::error::StackError;
use std::collections::HashMap;

/// One open call: its qualified name and entry timestamp
#[derive(Debug, Clone)]
struct Frame {
    name: String,
    entered_at: u64,
}

/// A completed call, ready to be merged into the tree
///
/// **Public** - produced on every well-formed exit
#[derive(Debug, Clone)]
pub struct FinishedCall {
    /// Call path from outermost open ancestor down to the finished call
    pub path: Vec<String>,

    /// Duration sample observed for this occurrence
    pub measurement: Measurement,
}

/// Tracks one call stack per context. Owned exclusively by the recorder's
/// single writer; no cross-context visibility exists by construction.
#[derive(Debug, Default)]
pub struct CallStackTracker {
    stacks: HashMap<ContextId, Vec<Frame>>,
}

impl CallStackTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a method entry: push a frame onto the context's stack,
    /// creating the stack if this is the context's first event.
    pub fn on_start(&mut self, context: ContextId, name: String, nano_time: u64) {
        self.stacks.entry(context).or_default().push(Frame {
            name,
            entered_at: nano_time,
        });
    }

    /// Record a method exit: pop the top frame and produce the finished
    /// call's path and duration.
    ///
    /// # Errors
    /// * `StackError::EmptyStack` - exit with no open call
    /// * `StackError::UnbalancedFinish` - exit name does not match the
    ///   innermost open call; the popped frame is discarded either way, so
    ///   the context can keep recording its remaining open calls
    pub fn on_finish(
        &mut self,
        context: ContextId,
        name: &str,
        nano_time: u64,
    ) -> Result<FinishedCall, StackError> {
        let stack = self.stacks.entry(context).or_default();

        let frame = stack.pop().ok_or_else(|| StackError::EmptyStack {
            context,
            finished: name.to_string(),
        })?;

        if frame.name != name {
            return Err(StackError::UnbalancedFinish {
                context,
                finished: name.to_string(),
                open: frame.name,
            });
        }

        // Ancestors still open, then the finished call itself
        let mut path: Vec<String> = stack.iter().map(|f| f.name.clone()).collect();
        path.push(frame.name);

        // A caller clock glitch degrades to a zero-length sample, not a panic
        let measurement = Measurement::from_nanos(nano_time.saturating_sub(frame.entered_at));

        Ok(FinishedCall { path, measurement })
    }

    /// Number of frames currently open for a context (0 when idle)
    pub fn open_frames(&self, context: ContextId) -> usize {
        self.stacks.get(&context).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: ContextId = ContextId::new(1);

    #[test]
    fn test_nested_calls_produce_ancestor_paths() {
        let mut tracker = CallStackTracker::new();

        tracker.on_start(CTX, "outer".to_string(), 100);
        tracker.on_start(CTX, "inner".to_string(), 150);

        let inner = tracker.on_finish(CTX, "inner", 350).unwrap();
        assert_eq!(inner.path, vec!["outer".to_string(), "inner".to_string()]);
        assert_eq!(inner.measurement.total(), 200.0);

        let outer = tracker.on_finish(CTX, "outer", 500).unwrap();
        assert_eq!(outer.path, vec!["outer".to_string()]);
        assert_eq!(outer.measurement.total(), 400.0);

        // Idle between top-level calls is a valid state
        assert_eq!(tracker.open_frames(CTX), 0);
    }

    #[test]
    fn test_contexts_do_not_share_stacks() {
        let mut tracker = CallStackTracker::new();
        let other = ContextId::new(2);

        tracker.on_start(CTX, "a".to_string(), 0);
        tracker.on_start(other, "b".to_string(), 0);

        let b = tracker.on_finish(other, "b", 10).unwrap();
        assert_eq!(b.path, vec!["b".to_string()]);
        assert_eq!(tracker.open_frames(CTX), 1);
    }

    #[test]
    fn test_finish_on_empty_stack_is_an_error() {
        let mut tracker = CallStackTracker::new();
        let err = tracker.on_finish(CTX, "ghost", 10).unwrap_err();
        assert!(matches!(err, StackError::EmptyStack { .. }));
    }

    #[test]
    fn test_unbalanced_finish_is_an_error_and_discards_the_frame() {
        let mut tracker = CallStackTracker::new();

        tracker.on_start(CTX, "outer".to_string(), 0);
        tracker.on_start(CTX, "inner".to_string(), 10);

        let err = tracker.on_finish(CTX, "outer", 20).unwrap_err();
        assert!(matches!(err, StackError::UnbalancedFinish { .. }));

        // "inner" was popped and dropped; "outer" is still open
        assert_eq!(tracker.open_frames(CTX), 1);
        let outer = tracker.on_finish(CTX, "outer", 30).unwrap();
        assert_eq!(outer.path, vec!["outer".to_string()]);
    }

    #[test]
    fn test_finish_before_start_uses_saturating_duration() {
        let mut tracker = CallStackTracker::new();
        tracker.on_start(CTX, "a".to_string(), 100);
        let done = tracker.on_finish(CTX, "a", 40).unwrap();
        assert_eq!(done.measurement.total(), 0.0);
    }
}
