// src/rolling/stats.rs
//! Statistics snapshot for rolling line buffers.

/// Point-in-time view of a [`RollingLineBuffer`](super::RollingLineBuffer).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollingStats {
    /// Records currently stored, read or not
    pub stored: usize,
    /// Stored records not yet read
    pub unread: usize,
    /// Maximum number of records retained
    pub capacity: usize,
    /// Bytes waiting for a delimiter
    pub partial_len: usize,
    /// Records completed since creation
    pub total_records: u64,
    /// Records discarded by capacity pressure since creation
    pub total_evicted: u64,
    /// Discarded records that had never been read
    pub total_lost: u64,
    /// Whether an unread record was lost since the last successful read
    pub lossy: bool,
}

impl RollingStats {
    /// Share of completed records that were evicted before being read (0.0-100.0).
    ///
    /// # Examples
    ///
    /// ```
    /// use seqbuf::prelude::*;
    ///
    /// let lines = RollingLineBuffer::new(2);
    /// lines.write(b"a\nb\nc\nd\n");
    ///
    /// let stats = lines.stats();
    /// assert_eq!(stats.total_lost, 2);
    /// assert_eq!(stats.loss_rate(), 50.0);
    /// ```
    pub fn loss_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (self.total_lost as f64 / self.total_records as f64) * 100.0
    }
}
