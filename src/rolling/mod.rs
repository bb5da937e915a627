// src/rolling/mod.rs
//! Rolling line buffer that keeps the most recent complete records

pub mod buffer;
pub(crate) mod config;
pub(crate) mod stats;

pub use buffer::RollingLineBuffer;
pub use config::RollingConfig;
pub use stats::RollingStats;
