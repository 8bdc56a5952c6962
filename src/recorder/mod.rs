//! Recording: turning concurrent entry/exit event streams into a
//! measurement tree behind one serialized writer.

pub mod api;
pub mod event;
pub mod service;
pub mod stack;

pub use api::TimeRecorder;
pub use event::{ContextId, MethodAction};
pub use service::AsyncRecorder;
pub use stack::CallStackTracker;
