//! Configuration and constants for the aggregation engine.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Name of the synthetic root node every recording session starts from.
/// The root carries no data; its children are the top-level call sites.
pub const ROOT_NODE_NAME: &str = "root";

/// Significance level for the generalized ESD outlier test
pub const ESD_ALPHA: f64 = 0.05;

// Mailbox sizing for the recorder's single writer. Producers get an explicit
// capacity error instead of blocking when the writer falls this far behind.
pub const MAILBOX_CAPACITY: usize = 65_536;

/// Name of the dedicated writer thread (shows up in panics and profilers)
pub const WRITER_THREAD_NAME: &str = "tempo-trace-writer";
