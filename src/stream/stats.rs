// src/stream/stats.rs
//! Statistics snapshot for positional write streams.

/// Point-in-time view of a [`WriteAtStream`](super::WriteAtStream).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStats {
    /// Bytes handed out by reads so far (the read origin)
    pub consumed: u64,
    /// Contiguous bytes readable right now
    pub ready: u64,
    /// Bytes written but not yet read, including those behind a gap
    pub pending: u64,
    /// Buffered span from the origin to the furthest write
    pub buffered: usize,
    /// Capacity of the backing allocation
    pub capacity: usize,
    /// Number of reallocations
    pub growths: usize,
    /// Current growth factor
    pub growth_factor: f64,
    /// Whether the stream was closed
    pub closed: bool,
}

impl StreamStats {
    /// Bytes written but stuck behind a gap.
    ///
    /// # Examples
    ///
    /// ```
    /// use seqbuf::prelude::*;
    ///
    /// let stream = WriteAtStream::new();
    /// stream.write_at(b"world", 6)?;
    /// assert_eq!(stream.stats().blocked(), 5);
    /// # Ok::<(), seqbuf::BufferError>(())
    /// ```
    pub fn blocked(&self) -> u64 {
        self.pending.saturating_sub(self.ready)
    }
}
