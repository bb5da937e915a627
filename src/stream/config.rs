// src/stream/config.rs
//! Configuration for positional write streams

/// Configuration for [`WriteAtStream`](super::WriteAtStream) behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Bytes reserved up front
    pub initial_capacity: usize,
    /// Capacity multiplier applied to the required length on growth.
    /// Values below 1, NaN, or infinity behave as 1, i.e. exact-fit growth.
    pub growth_factor: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            growth_factor: 1.0,
        }
    }
}

impl StreamConfig {
    /// Reassembly of a download fetched in parallel ranges.
    pub fn chunked_download() -> Self {
        Self {
            initial_capacity: 64 * 1024, // 64KB
            growth_factor: 2.0,
        }
    }
}

/// Clamps a growth factor to the supported range.
#[inline]
pub(crate) fn sanitize_growth(factor: f64) -> f64 {
    if factor.is_finite() && factor >= 1.0 { factor } else { 1.0 }
}
