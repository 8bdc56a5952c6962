//! A single observed duration for one call-site occurrence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One timing sample: the total duration of a single call, in nanoseconds.
///
/// **Public** - leaf value of the measurement tree
///
/// Immutable once created. The recorder produces one on every method exit;
/// the cleaner reads the totals and never mutates them.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Measurement {
    total: f64,
}

impl Measurement {
    /// Create a measurement from a duration in nanoseconds
    ///
    /// **Public** - constructor
    pub fn new(total: f64) -> Self {
        debug_assert!(total >= 0.0, "measurement duration must be non-negative");
        Self { total }
    }

    /// Create a measurement from a raw nanosecond delta
    pub fn from_nanos(nanos: u64) -> Self {
        Self::new(nanos as f64)
    }

    /// Total duration in nanoseconds
    pub fn total(&self) -> f64 {
        self.total
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}ns", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_nanos() {
        let m = Measurement::from_nanos(1500);
        assert_eq!(m.total(), 1500.0);
    }

    #[test]
    fn test_display() {
        let m = Measurement::new(42.0);
        assert_eq!(m.to_string(), "42ns");
    }
}
