// src/stream/mod.rs
//! Positional write stream: out-of-order writes, in-order reads

pub(crate) mod config;
pub mod coverage;
pub(crate) mod stats;
pub mod writer;

pub use config::StreamConfig;
pub use coverage::RangeSet;
pub use stats::StreamStats;
pub use writer::{WriteAt, WriteAtStream};
