// src/rolling/buffer.rs
//! Rolling line buffer: keeps the N most recent delimited records
//!
//! # Reading
//!
//! Reads are forward-only and only ever hand out whole records, each followed
//! by the delimiter. A destination that cannot hold the next record fails with
//! [`ShortBufferError`] and leaves the buffer untouched.
//!
//! # Multi-byte delimiters
//!
//! Delimiters are matched within a single `write` call. A multi-byte delimiter
//! split across two writes is not recognised and ends up inside the record.
//!
//! # Memory Safety
//!
//! Evicted records, the pending partial record, and all storage on drop are
//! securely zeroed.

use super::config::RollingConfig;
use super::stats::RollingStats;
use crate::error::{Result, ShortBufferError};
use std::collections::VecDeque;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use zeroize::Zeroize;

struct RollingInner {
    records: VecDeque<Vec<u8>>,
    partial: Vec<u8>,
    read_pos: usize,
    lossy: bool,
    total_records: u64,
    total_evicted: u64,
    total_lost: u64,
}

impl RollingInner {
    fn push_record(&mut self, record: Vec<u8>) {
        tracing::trace!(len = record.len(), "record completed");
        self.records.push_back(record);
        self.total_records += 1;
    }

    /// Drops the oldest records until at most `capacity` remain.
    fn trim(&mut self, capacity: usize) {
        if self.records.len() <= capacity {
            return;
        }

        let shift = self.records.len() - capacity;
        for mut record in self.records.drain(..shift) {
            record.zeroize();
        }
        self.total_evicted += shift as u64;

        if shift > self.read_pos {
            let lost = shift - self.read_pos;
            self.total_lost += lost as u64;
            self.read_pos = 0;
            self.lossy = true;
            tracing::warn!(lost, capacity, "unread records evicted");
        } else {
            self.read_pos -= shift;
        }
    }
}

/// Thread-safe buffer of the most recent `capacity` records written to it.
///
/// Incomplete trailing data is held back until its delimiter arrives. All
/// methods take `&self`; the buffer can be shared across threads via `Arc`.
///
/// # Example
///
/// ```rust
/// use seqbuf::prelude::*;
///
/// let lines = RollingLineBuffer::new(2);
/// lines.write(b"hello\nworld\ngood");
/// lines.write(b"bye\n");
///
/// let mut out = [0u8; 64];
/// let n = lines.read(&mut out)?;
/// assert_eq!(&out[..n], b"world\ngoodbye\n");
/// assert!(!lines.lossy_reads());
/// # Ok::<(), seqbuf::BufferError>(())
/// ```
pub struct RollingLineBuffer {
    inner: Mutex<RollingInner>,
    capacity: usize,
    delimiter: Vec<u8>,
}

impl Default for RollingLineBuffer {
    fn default() -> Self {
        Self::with_config(RollingConfig::default())
    }
}

impl RollingLineBuffer {
    /// Creates a buffer holding the `capacity` most recent newline-terminated lines.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(RollingConfig::lines(capacity))
    }

    /// Creates a buffer that splits records on `delimiter`.
    ///
    /// An empty delimiter falls back to `b"\n"`.
    pub fn with_delimiter(capacity: usize, delimiter: impl Into<Vec<u8>>) -> Self {
        Self::with_config(RollingConfig::lines(capacity).delimiter(delimiter))
    }

    /// Creates a buffer from a [`RollingConfig`].
    pub fn with_config(config: RollingConfig) -> Self {
        Self {
            inner: Mutex::new(RollingInner {
                records: VecDeque::with_capacity(config.capacity.min(4096)),
                partial: Vec::new(),
                read_pos: 0,
                lossy: false,
                total_records: 0,
                total_evicted: 0,
                total_lost: 0,
            }),
            capacity: config.capacity,
            delimiter: config.effective_delimiter(),
        }
    }

    // Every transition completes before the guard drops, so a poisoned lock
    // still holds consistent state.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, RollingInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Maximum number of records retained.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record delimiter.
    #[inline(always)]
    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    /// Number of records currently stored, read or not.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Returns `true` if no complete record is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Number of stored records not yet read.
    pub fn unread(&self) -> usize {
        let inner = self.lock();
        inner.records.len() - inner.read_pos
    }

    /// Bytes written since the last delimiter.
    pub fn partial_len(&self) -> usize {
        self.lock().partial.len()
    }

    /// Returns `true` if an unread record was evicted since the last
    /// successful read.
    pub fn lossy_reads(&self) -> bool {
        self.lock().lossy
    }

    /// Copies out every stored record, oldest first, without delimiters.
    ///
    /// Does not move the read cursor.
    pub fn records(&self) -> Vec<Vec<u8>> {
        self.lock().records.iter().cloned().collect()
    }

    /// Returns a snapshot of buffer statistics.
    pub fn stats(&self) -> RollingStats {
        let inner = self.lock();
        RollingStats {
            stored: inner.records.len(),
            unread: inner.records.len() - inner.read_pos,
            capacity: self.capacity,
            partial_len: inner.partial.len(),
            total_records: inner.total_records,
            total_evicted: inner.total_evicted,
            total_lost: inner.total_lost,
            lossy: inner.lossy,
        }
    }

    /// Appends `data`, completing a record at every delimiter.
    ///
    /// Data after the last delimiter is held as a partial record and prefixed
    /// to the next write. Once more than `capacity` records are stored the
    /// oldest are discarded; if any of those were unread, [`lossy_reads`]
    /// becomes `true`.
    ///
    /// Always accepts all of `data` and returns its length.
    ///
    /// [`lossy_reads`]: Self::lossy_reads
    pub fn write(&self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }

        let delim = self.delimiter.as_slice();
        let mut inner = self.lock();
        let mut rest = data;

        while let Some(at) = find(rest, delim) {
            let mut record = std::mem::take(&mut inner.partial);
            record.extend_from_slice(&rest[..at]);
            inner.push_record(record);
            rest = &rest[at + delim.len()..];
        }
        inner.partial.extend_from_slice(rest);

        inner.trim(self.capacity);
        data.len()
    }

    /// Reads as many whole unread records as fit into `buf`.
    ///
    /// Each record is followed by the delimiter. Returns `Ok(0)` when every
    /// stored record has been read; this is not end-of-stream, more records
    /// may be written later.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::ShortBuffer`](crate::BufferError::ShortBuffer)
    /// if the next record plus its delimiter is longer than `buf`. The read
    /// cursor does not move.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let delim = self.delimiter.as_slice();
        let mut inner = self.lock();

        let Some(first) = inner.records.get(inner.read_pos) else {
            return Ok(0);
        };
        let needed = first.len() + delim.len();
        if needed > buf.len() {
            return Err(ShortBufferError::new(needed).into());
        }

        let mut written = 0;
        while let Some(record) = inner.records.get(inner.read_pos) {
            let end = written + record.len() + delim.len();
            if end > buf.len() {
                break;
            }

            buf[written..written + record.len()].copy_from_slice(record);
            buf[written + record.len()..end].copy_from_slice(delim);
            written = end;
            inner.read_pos += 1;
        }

        inner.lossy = false;
        Ok(written)
    }

    /// Securely zeros and discards all records, the partial record, and the
    /// read cursor. Statistics counters are kept.
    pub fn burn(&self) {
        let mut inner = self.lock();
        for record in inner.records.iter_mut() {
            record.zeroize();
        }
        inner.records.clear();
        inner.partial.zeroize();
        inner.read_pos = 0;
        inner.lossy = false;
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
#[inline]
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    match needle {
        [byte] => haystack.iter().position(|b| b == byte),
        _ => haystack
            .windows(needle.len())
            .position(|window| window == needle),
    }
}

impl Drop for RollingLineBuffer {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        for record in inner.records.iter_mut() {
            record.zeroize();
        }
        inner.partial.zeroize();
    }
}

impl io::Write for &RollingLineBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(RollingLineBuffer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for RollingLineBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(RollingLineBuffer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `io::Read` adapter.
///
/// No unread record yields [`io::ErrorKind::WouldBlock`], since `Ok(0)` would
/// signal end-of-file to generic readers. A short destination yields an
/// [`io::ErrorKind::InvalidInput`] error wrapping [`ShortBufferError`].
impl io::Read for &RollingLineBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match RollingLineBuffer::read(self, buf)? {
            0 => Err(io::ErrorKind::WouldBlock.into()),
            n => Ok(n),
        }
    }
}

impl io::Read for RollingLineBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }
}
