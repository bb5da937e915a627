// src/rolling/config.rs
//! Configuration for rolling line buffers

/// Delimiter used when none is configured.
pub const DEFAULT_DELIMITER: &[u8] = b"\n";

/// Configuration for [`RollingLineBuffer`](super::RollingLineBuffer) behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingConfig {
    /// Maximum number of complete records retained
    pub capacity: usize,
    /// Record terminator; an empty delimiter falls back to `b"\n"`
    pub delimiter: Vec<u8>,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            delimiter: DEFAULT_DELIMITER.to_vec(),
        }
    }
}

impl RollingConfig {
    /// Newline-delimited buffer holding `capacity` lines.
    pub fn lines(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Short tail of process output, e.g. the last lines before a crash.
    pub fn log_tail() -> Self {
        Self::lines(100)
    }

    /// Larger history for audit trails.
    pub fn audit() -> Self {
        Self::lines(10_000)
    }

    /// Replaces the delimiter, keeping the capacity.
    pub fn delimiter(mut self, delimiter: impl Into<Vec<u8>>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub(crate) fn effective_delimiter(&self) -> Vec<u8> {
        if self.delimiter.is_empty() {
            DEFAULT_DELIMITER.to_vec()
        } else {
            self.delimiter.clone()
        }
    }
}
