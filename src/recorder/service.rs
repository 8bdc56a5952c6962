//! Asynchronous single-writer recorder.
//!
//! Many concurrent producers enqueue entry/exit events into one bounded
//! mailbox; a dedicated writer thread is the only actor that touches the
//! call-stack tracker and the measurement tree, so the tree needs no locks
//! by construction. `stop()` closes the mailbox, lets the writer drain
//! every accepted event, and only then exposes the finished tree.

use crate::recorder::event::{ContextId, MethodAction};
use crate::recorder::stack::CallStackTracker;
use crate::recorder::TimeRecorder;
use crate::tree::{MeasurementTree, MergeableCollection, MergeableNode};
use crate::utils::config::{MAILBOX_CAPACITY, ROOT_NODE_NAME, WRITER_THREAD_NAME};
use crate::utils::error::RecorderError;
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, error, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// One mailbox entry: the emitting context plus its event
type Envelope = (ContextId, MethodAction);

/// Lifecycle: Created -> Started -> Stopped (terminal). Draining is the
/// window inside `stop()` where the mailbox is closed but the writer has
/// not been joined yet; submissions during it fail explicitly.
enum State {
    Created,
    Started {
        mailbox: Sender<Envelope>,
        writer: JoinHandle<MeasurementTree>,
    },
    Draining,
    Stopped {
        tree: MeasurementTree,
    },
}

/// Actor-style aggregation service turning concurrent event streams into
/// one measurement tree.
///
/// **Public** - the recorder backend this crate ships
///
/// Producers only ever touch the enqueue boundary; the channel preserves
/// FIFO order per context, which is all stack correctness requires.
pub struct AsyncRecorder {
    state: Mutex<State>,
}

impl AsyncRecorder {
    /// Create a recorder in the `Created` state
    ///
    /// **Public** - constructor; call `start()` before recording
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Created),
        }
    }

    // A producer panicking mid-record must not wedge every other producer.
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate the mailbox and spawn the single writer
    ///
    /// # Errors
    /// * `RecorderError::AlreadyStarted` - started twice
    /// * `RecorderError::AlreadyStopped` - the lifecycle is terminal
    /// * `RecorderError::WorkerSpawn` - thread creation failed
    pub fn start(&self) -> Result<(), RecorderError> {
        let mut state = self.lock_state();
        match *state {
            State::Created => {
                let (mailbox, events) = bounded(MAILBOX_CAPACITY);
                let writer = std::thread::Builder::new()
                    .name(WRITER_THREAD_NAME.to_string())
                    .spawn(move || run_writer(events))?;

                info!("recorder started (mailbox capacity {})", MAILBOX_CAPACITY);
                *state = State::Started { mailbox, writer };
                Ok(())
            }
            State::Started { .. } => Err(RecorderError::AlreadyStarted),
            State::Draining | State::Stopped { .. } => Err(RecorderError::AlreadyStopped),
        }
    }

    /// Submit one event. Non-blocking: a full mailbox surfaces as a
    /// capacity error instead of stalling the producer on the writer.
    ///
    /// # Errors
    /// * `RecorderError::NotStarted` - recording before `start()`
    /// * `RecorderError::AlreadyStopped` - recording after `stop()` began
    /// * `RecorderError::QueueFull` - writer is falling behind
    pub fn record(&self, context: ContextId, action: MethodAction) -> Result<(), RecorderError> {
        match &*self.lock_state() {
            State::Started { mailbox, .. } => {
                mailbox.try_send((context, action)).map_err(|e| match e {
                    TrySendError::Full(_) => RecorderError::QueueFull {
                        capacity: MAILBOX_CAPACITY,
                    },
                    TrySendError::Disconnected(_) => RecorderError::WorkerGone,
                })
            }
            State::Created => Err(RecorderError::NotStarted),
            State::Draining | State::Stopped { .. } => Err(RecorderError::AlreadyStopped),
        }
    }

    /// Close the mailbox, drain all accepted events, and become terminal.
    /// Every event accepted before this call is reflected in the final
    /// tree. Calling `stop()` on a stopped recorder is a no-op.
    ///
    /// # Errors
    /// * `RecorderError::NotStarted` - nothing was ever started
    /// * `RecorderError::WorkerPanicked` - the writer died mid-drain
    pub fn stop(&self) -> Result<(), RecorderError> {
        let mut state = self.lock_state();
        match std::mem::replace(&mut *state, State::Draining) {
            State::Started { mailbox, writer } => {
                // Release the lock during the drain so producers fail fast
                // with AlreadyStopped instead of parking on the mutex.
                drop(state);

                debug!("recorder draining {} queued events", mailbox.len());
                drop(mailbox);

                let tree = writer.join().map_err(|_| {
                    error!("recorder writer panicked; tree lost");
                    RecorderError::WorkerPanicked
                })?;

                info!("recorder stopped; tree holds {} nodes", tree.count_nodes());
                *self.lock_state() = State::Stopped { tree };
                Ok(())
            }
            State::Stopped { tree } => {
                *state = State::Stopped { tree };
                Ok(())
            }
            State::Created => {
                *state = State::Created;
                Err(RecorderError::NotStarted)
            }
            // Another thread is already joining the writer; treat this call
            // as the no-op second stop.
            State::Draining => Ok(()),
        }
    }

    /// The finished tree, readable only after `stop()` completes
    ///
    /// # Errors
    /// * `RecorderError::NotStarted` / `RecorderError::StillRunning` - the
    ///   lifecycle has not reached `Stopped`
    pub fn finished_tree(&self) -> Result<MeasurementTree, RecorderError> {
        match &*self.lock_state() {
            State::Stopped { tree } => Ok(tree.clone()),
            State::Created => Err(RecorderError::NotStarted),
            State::Started { .. } | State::Draining => Err(RecorderError::StillRunning),
        }
    }
}

impl Default for AsyncRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeRecorder for AsyncRecorder {
    fn start(&self) -> Result<(), RecorderError> {
        AsyncRecorder::start(self)
    }

    fn record(&self, context: ContextId, action: MethodAction) -> Result<(), RecorderError> {
        AsyncRecorder::record(self, context, action)
    }

    fn stop(&self) -> Result<(), RecorderError> {
        AsyncRecorder::stop(self)
    }
}

/// Writer loop: the only code that mutates the tracker and the tree.
/// Returns the finished tree once the mailbox is closed and drained.
fn run_writer(events: Receiver<Envelope>) -> MeasurementTree {
    let mut tracker = CallStackTracker::new();
    let mut root = MergeableNode::new(ROOT_NODE_NAME);
    let mut faults = 0u64;

    while let Ok((context, action)) = events.recv() {
        apply(&mut tracker, &mut root, context, action, &mut faults);
    }

    if faults > 0 {
        warn!("writer drained with {} discarded measurements", faults);
    }
    debug!(
        "writer drained; {} nodes, {} samples",
        root.count_nodes(),
        root.total_samples()
    );
    root
}

/// Apply one event. A stack fault is scoped to its context: the offending
/// measurement is discarded and reported, everything else keeps flowing.
fn apply(
    tracker: &mut CallStackTracker,
    root: &mut MeasurementTree,
    context: ContextId,
    action: MethodAction,
    faults: &mut u64,
) {
    match action {
        MethodAction::Started {
            method_name,
            nano_time,
        } => tracker.on_start(context, method_name, nano_time),

        MethodAction::Finished {
            method_name,
            nano_time,
        } => match tracker.on_finish(context, &method_name, nano_time) {
            Ok(finished) => {
                root.ensure_path(finished.path.iter().map(String::as_str))
                    .merge_data(MergeableCollection::of(finished.measurement));
            }
            Err(err) => {
                *faults += 1;
                error!("discarding measurement: {}", err);
            }
        },
    }
}
