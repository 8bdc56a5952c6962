//! Event model for the recorder: context identity and the
//! method-entry/method-exit actions emitted by instrumentation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one logical execution lineage (thread, fiber, or
/// explicit correlation id).
///
/// **Public** - keys the per-context call stacks
///
/// A context owns exactly one call stack and must not be shared between
/// concurrently overlapping call chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(u64);

impl ContextId {
    /// Wrap a raw context id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ContextId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One instrumentation event: a method entered or exited at a monotonic
/// nanosecond timestamp.
///
/// **Public** - what producers hand to `AsyncRecorder::record`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodAction {
    /// An instrumented method was entered
    Started { method_name: String, nano_time: u64 },

    /// The matching method exited
    Finished { method_name: String, nano_time: u64 },
}

impl MethodAction {
    /// Convenience constructor for an entry event
    pub fn started(method_name: impl Into<String>, nano_time: u64) -> Self {
        Self::Started {
            method_name: method_name.into(),
            nano_time,
        }
    }

    /// Convenience constructor for an exit event
    pub fn finished(method_name: impl Into<String>, nano_time: u64) -> Self {
        Self::Finished {
            method_name: method_name.into(),
            nano_time,
        }
    }

    /// Qualified name of the method the event refers to
    pub fn method_name(&self) -> &str {
        match self {
            Self::Started { method_name, .. } | Self::Finished { method_name, .. } => method_name,
        }
    }

    /// Monotonic timestamp of the event, in nanoseconds
    pub fn nano_time(&self) -> u64 {
        match self {
            Self::Started { nano_time, .. } | Self::Finished { nano_time, .. } => *nano_time,
        }
    }
}
