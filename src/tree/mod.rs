//! Mergeable measurement tree: the data model shared by the recorder,
//! the outlier cleaner, and downstream consumers.

pub mod collection;
pub mod measurement;
pub mod node;

pub use collection::{Mergeable, MergeableCollection};
pub use measurement::Measurement;
pub use node::MergeableNode;

/// The concrete tree every recording session produces: per-call-path
/// collections of duration samples.
pub type MeasurementTree = MergeableNode<MergeableCollection<Measurement>>;
