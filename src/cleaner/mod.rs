//! Statistical cleaning of finished measurement trees.

pub mod esd;

pub use esd::clean;
