// src/stream/writer.rs
//! Positional write stream
//!
//! Producers write at absolute offsets in any order; a single consumer reads
//! the bytes back in order, as soon as the front of the stream has no gaps.
//!
//! # Offsets
//!
//! Offsets are absolute positions in the logical stream, independent of how
//! much has already been read. Bytes behind the read origin were already
//! delivered: a write landing there is accepted, but that part is discarded
//! and never re-delivered.
//!
//! # Memory Safety
//!
//! Consumed bytes are securely zeroed as they are read, as is the old
//! allocation on growth and all storage on drop.

use super::config::{StreamConfig, sanitize_growth};
use super::coverage::RangeSet;
use super::stats::StreamStats;
use crate::error::{BufferError, Result};
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use zeroize::Zeroize;

/// Positional counterpart of [`io::Write`]: writes at an absolute offset
/// through a shared reference.
pub trait WriteAt {
    /// Writes up to `buf.len()` bytes at `offset`, returning how many were
    /// written.
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize>;

    /// Writes all of `buf` at `offset`, retrying short writes.
    fn write_all_at(&self, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write_at(buf, offset) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => {
                    buf = &buf[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<T: WriteAt + ?Sized> WriteAt for &T {
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        (**self).write_at(buf, offset)
    }
}

impl<T: WriteAt + ?Sized> WriteAt for std::sync::Arc<T> {
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        (**self).write_at(buf, offset)
    }
}

#[cfg(unix)]
impl WriteAt for std::fs::File {
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::write_at(self, buf, offset)
    }
}

struct StreamInner {
    /// Live bytes are `buf[head..]`; `buf[head]` sits at stream offset `consumed`.
    buf: Vec<u8>,
    head: usize,
    avail: RangeSet,
    consumed: u64,
    closed: bool,
    growth_factor: f64,
    growths: usize,
}

impl StreamInner {
    #[inline]
    fn live_len(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Makes `buf[head..head + len]` addressable, growing if needed.
    fn ensure_len(&mut self, len: usize) -> Result<()> {
        if self.live_len() >= len {
            return Ok(());
        }

        if self.head + len > self.buf.capacity() {
            if len <= self.buf.capacity() {
                self.compact();
            } else {
                self.grow(len)?;
            }
        }

        let new_len = self.head + len;
        self.buf.resize(new_len, 0);
        Ok(())
    }

    /// Moves live bytes to the front of the allocation.
    fn compact(&mut self) {
        let live = self.live_len();
        self.buf.copy_within(self.head.., 0);
        self.buf[live..].zeroize();
        self.buf.truncate(live);
        self.head = 0;
    }

    /// Moves live bytes into a fresh allocation of
    /// `growth_factor * required` bytes and wipes the old one.
    ///
    /// Falls back to exactly `required` bytes if the scaled size cannot be
    /// allocated.
    fn grow(&mut self, required: usize) -> Result<()> {
        // Float-to-int casts saturate, so an oversized product lands on
        // usize::MAX and is refused by try_reserve_exact below.
        let target = ((self.growth_factor * required as f64) as usize).max(required);

        let mut grown = Vec::new();
        if grown.try_reserve_exact(target).is_err() {
            grown
                .try_reserve_exact(required)
                .map_err(|_| BufferError::SizeTooBig)?;
        }
        grown.extend_from_slice(&self.buf[self.head..]);

        tracing::trace!(
            required,
            old_capacity = self.buf.capacity(),
            new_capacity = grown.capacity(),
            "stream buffer grown"
        );

        self.buf.zeroize();
        self.buf = grown;
        self.head = 0;
        self.growths += 1;
        Ok(())
    }
}

/// Buffer that accepts writes at arbitrary offsets and reads them back in
/// order.
///
/// Reads never block: if the byte at the read origin has not been written
/// yet, [`read`](Self::read) returns `Ok(0)`. Once [`close`](Self::close)d,
/// writes fail with [`BufferError::Closed`] and reads drain what is ready,
/// then report [`BufferError::EndOfStream`].
///
/// # Example
///
/// ```rust
/// use seqbuf::prelude::*;
///
/// let stream = WriteAtStream::new();
/// stream.write_at(b"world", 6)?;
///
/// let mut out = [0u8; 11];
/// assert_eq!(stream.read(&mut out)?, 0);
///
/// stream.write_at(b"hello ", 0)?;
/// assert_eq!(stream.read(&mut out)?, 11);
/// assert_eq!(&out, b"hello world");
/// # Ok::<(), seqbuf::BufferError>(())
/// ```
pub struct WriteAtStream {
    inner: Mutex<StreamInner>,
}

impl Default for WriteAtStream {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteAtStream {
    /// Creates an empty stream with exact-fit growth.
    pub fn new() -> Self {
        Self::with_config(StreamConfig::default())
    }

    /// Creates a stream with `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(StreamConfig {
            initial_capacity: capacity,
            ..StreamConfig::default()
        })
    }

    /// Creates a stream from a [`StreamConfig`].
    pub fn with_config(config: StreamConfig) -> Self {
        Self::from_parts(Vec::with_capacity(config.initial_capacity), config.growth_factor)
    }

    /// Creates a stream that reuses `buf` as its backing storage.
    ///
    /// The previous contents of `buf` are wiped and are not readable.
    pub fn from_vec(mut buf: Vec<u8>) -> Self {
        buf.as_mut_slice().zeroize();
        buf.clear();
        Self::from_parts(buf, 1.0)
    }

    fn from_parts(buf: Vec<u8>, growth_factor: f64) -> Self {
        Self {
            inner: Mutex::new(StreamInner {
                buf,
                head: 0,
                avail: RangeSet::new(),
                consumed: 0,
                closed: false,
                growth_factor: sanitize_growth(growth_factor),
                growths: 0,
            }),
        }
    }

    // Every transition completes before the guard drops, so a poisoned lock
    // still holds consistent state.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, StreamInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current growth factor.
    pub fn growth_factor(&self) -> f64 {
        self.lock().growth_factor
    }

    /// Sets the capacity multiplier used on the next growth.
    ///
    /// Values below 1, NaN, and infinity are treated as 1. A finite factor
    /// too large to allocate falls back to exact-fit growth.
    pub fn set_growth_factor(&self, factor: f64) {
        self.lock().growth_factor = sanitize_growth(factor);
    }

    /// Bytes handed out by reads so far.
    pub fn consumed(&self) -> u64 {
        self.lock().consumed
    }

    /// Contiguous bytes that the next read could return.
    pub fn ready(&self) -> u64 {
        self.lock().avail.contiguous_prefix()
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Returns a snapshot of stream statistics.
    pub fn stats(&self) -> StreamStats {
        let inner = self.lock();
        StreamStats {
            consumed: inner.consumed,
            ready: inner.avail.contiguous_prefix(),
            pending: inner.avail.covered(),
            buffered: inner.live_len(),
            capacity: inner.buf.capacity(),
            growths: inner.growths,
            growth_factor: inner.growth_factor,
            closed: inner.closed,
        }
    }

    /// Writes `data` so that it will be read starting at stream offset `offset`.
    ///
    /// Writes may arrive in any order and may overlap; for overlapping bytes
    /// the last write wins. Returns `data.len()`. An empty write changes
    /// nothing and returns `0`.
    ///
    /// # Errors
    ///
    /// - [`BufferError::Closed`] if the stream was closed.
    /// - [`BufferError::SizeTooBig`] if the write ends past `u64::MAX` or
    ///   the buffer reaching it cannot be allocated. Nothing is written.
    pub fn write_at(&self, data: &[u8], offset: u64) -> Result<usize> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(BufferError::Closed);
        }
        if data.is_empty() {
            return Ok(0);
        }

        let end = offset
            .checked_add(data.len() as u64)
            .ok_or(BufferError::SizeTooBig)?;
        if end <= inner.consumed {
            tracing::trace!(offset, len = data.len(), "write behind read origin dropped");
            return Ok(data.len());
        }

        let skip = inner.consumed.saturating_sub(offset) as usize;
        let fresh = &data[skip..];
        let rel = usize::try_from(offset + skip as u64 - inner.consumed)
            .map_err(|_| BufferError::SizeTooBig)?;
        let span = rel
            .checked_add(fresh.len())
            .filter(|span| inner.head.checked_add(*span).is_some())
            .ok_or(BufferError::SizeTooBig)?;

        inner.ensure_len(span)?;
        let at = inner.head + rel;
        inner.buf[at..at + fresh.len()].copy_from_slice(fresh);
        inner.avail.insert(rel as u64..span as u64);

        Ok(data.len())
    }

    /// Reads the contiguous bytes at the front of the stream into `buf`.
    ///
    /// Returns `Ok(0)` if the byte at the read origin has not been written
    /// yet. Returned bytes are consumed and never returned again.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::EndOfStream`] once the stream is closed and
    /// nothing contiguous remains.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let mut inner = self.lock();

        let ready = inner.avail.contiguous_prefix();
        if ready == 0 {
            return if inner.closed {
                Err(BufferError::EndOfStream)
            } else {
                Ok(0)
            };
        }

        let n = (ready as usize).min(buf.len());
        if n == 0 {
            return Ok(0);
        }

        let head = inner.head;
        buf[..n].copy_from_slice(&inner.buf[head..head + n]);
        inner.buf[head..head + n].zeroize();
        inner.head += n;
        inner.consumed += n as u64;
        inner.avail.consume(n as u64);

        if inner.head == inner.buf.len() {
            inner.buf.clear();
            inner.head = 0;
        }

        Ok(n)
    }

    /// Closes the stream. Idempotent.
    ///
    /// Subsequent writes fail with [`BufferError::Closed`]; reads drain the
    /// bytes that are already contiguous and then report end-of-stream.
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        tracing::debug!(
            consumed = inner.consumed,
            ready = inner.avail.contiguous_prefix(),
            pending = inner.avail.covered(),
            "stream closed"
        );
    }
}

impl Drop for WriteAtStream {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.buf.zeroize();
    }
}

impl WriteAt for WriteAtStream {
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        WriteAtStream::write_at(self, buf, offset).map_err(Into::into)
    }
}

/// `io::Read` adapter.
///
/// Nothing ready on an open stream yields [`io::ErrorKind::WouldBlock`];
/// a closed, drained stream yields `Ok(0)`.
impl io::Read for &WriteAtStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match WriteAtStream::read(self, buf) {
            Ok(0) => Err(io::ErrorKind::WouldBlock.into()),
            Ok(n) => Ok(n),
            Err(BufferError::EndOfStream) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl io::Read for WriteAtStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(stream: &WriteAtStream) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 4];
        loop {
            match stream.read(&mut buf) {
                Ok(0) | Err(BufferError::EndOfStream) => return out,
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
    }

    #[test]
    fn test_write_then_read() {
        let stream = WriteAtStream::new();
        assert_eq!(stream.write_at(b"hello world", 0).unwrap(), 11);

        let mut buf = [0u8; 11];
        assert_eq!(stream.read(&mut buf).unwrap(), 11);
        assert_eq!(&buf, b"hello world");
        assert_eq!(stream.consumed(), 11);
    }

    #[test]
    fn test_read_before_front_written() {
        let stream = WriteAtStream::new();
        stream.write_at(b"world", 6).unwrap();

        let mut buf = [0u8; 11];
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
        assert_eq!(stream.ready(), 0);

        stream.write_at(b"hello ", 0).unwrap();
        assert_eq!(stream.ready(), 11);
        assert_eq!(stream.read(&mut buf).unwrap(), 11);
        assert_eq!(&buf, b"hello world");
    }

    #[test]
    fn test_read_caps_at_destination() {
        let stream = WriteAtStream::new();
        stream.write_at(b"abcdefgh", 0).unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(stream.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");
        assert_eq!(drain(&stream), b"defgh");
    }

    #[test]
    fn test_offsets_are_absolute_after_reads() {
        let stream = WriteAtStream::new();
        stream.write_at(b"abc", 0).unwrap();
        assert_eq!(drain(&stream), b"abc");

        stream.write_at(b"ghi", 6).unwrap();
        stream.write_at(b"def", 3).unwrap();
        assert_eq!(drain(&stream), b"defghi");
        assert_eq!(stream.consumed(), 9);
    }

    #[test]
    fn test_overlapping_write_last_wins() {
        let stream = WriteAtStream::new();
        stream.write_at(b"aaaa", 2).unwrap();
        stream.write_at(b"bb", 4).unwrap();
        stream.write_at(b"cc", 0).unwrap();
        assert_eq!(drain(&stream), b"ccaabb");
    }

    #[test]
    fn test_consumed_bytes_never_redelivered() {
        let stream = WriteAtStream::new();
        stream.write_at(b"hello", 0).unwrap();
        assert_eq!(drain(&stream), b"hello");

        assert_eq!(stream.write_at(b"HELLO", 0).unwrap(), 5);
        assert_eq!(stream.ready(), 0);

        // Straddles the origin: only the unread tail is kept.
        assert_eq!(stream.write_at(b"LO wo", 3).unwrap(), 5);
        assert_eq!(drain(&stream), b" wo");
        assert_eq!(stream.consumed(), 8);
    }

    #[test]
    fn test_close_rejects_writes_and_drains() {
        let stream = WriteAtStream::new();
        stream.write_at(b"tail", 0).unwrap();
        stream.write_at(b"lost", 10).unwrap();
        stream.close();
        stream.close();
        assert!(stream.is_closed());

        assert_eq!(stream.write_at(b"x", 4), Err(BufferError::Closed));

        let mut buf = [0u8; 16];
        assert_eq!(stream.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"tail");
        assert_eq!(stream.read(&mut buf), Err(BufferError::EndOfStream));
        assert_eq!(stream.read(&mut buf), Err(BufferError::EndOfStream));
    }

    #[test]
    fn test_close_empty_stream() {
        let stream = WriteAtStream::new();
        stream.close();
        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf), Err(BufferError::EndOfStream));
    }

    #[test]
    fn test_exact_fit_growth() {
        let stream = WriteAtStream::new();
        stream.write_at(b"xyz", 7).unwrap();

        let stats = stream.stats();
        assert_eq!(stats.buffered, 10);
        assert_eq!(stats.capacity, 10);
        assert_eq!(stats.growths, 1);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.blocked(), 3);

        stream.write_at(b"abcdefg", 0).unwrap();
        stream.write_at(b"!", 10).unwrap();
        let stats = stream.stats();
        assert_eq!(stats.capacity, 11);
        assert_eq!(stats.growths, 2);
        assert_eq!(drain(&stream), b"abcdefgxyz!");
    }

    #[test]
    fn test_growth_factor() {
        let stream = WriteAtStream::new();
        stream.set_growth_factor(2.0);
        stream.write_at(b"abcd", 0).unwrap();
        assert_eq!(stream.stats().capacity, 8);

        stream.write_at(b"efghij", 4).unwrap();
        let stats = stream.stats();
        assert_eq!(stats.capacity, 20);
        assert_eq!(stats.growths, 2);

        stream.set_growth_factor(0.25);
        assert_eq!(stream.growth_factor(), 1.0);
        stream.set_growth_factor(f64::NAN);
        assert_eq!(stream.growth_factor(), 1.0);
    }

    #[test]
    fn test_unbounded_growth_factor_falls_back_to_exact_fit() {
        let stream = WriteAtStream::new();
        stream.set_growth_factor(f64::INFINITY);
        assert_eq!(stream.growth_factor(), 1.0);
        assert_eq!(stream.write_at(b"abc", 0).unwrap(), 3);
        assert_eq!(stream.stats().capacity, 3);

        stream.set_growth_factor(1e300);
        assert_eq!(stream.growth_factor(), 1e300);
        assert_eq!(stream.write_at(b"def", 3).unwrap(), 3);
        let stats = stream.stats();
        assert_eq!(stats.capacity, 6);
        assert_eq!(stats.growths, 2);
        assert_eq!(drain(&stream), b"abcdef");

        let stream = WriteAtStream::with_config(StreamConfig {
            initial_capacity: 0,
            growth_factor: f64::INFINITY,
        });
        assert_eq!(stream.growth_factor(), 1.0);
    }

    #[test]
    fn test_offset_past_addressable_range() {
        let stream = WriteAtStream::new();
        assert_eq!(stream.write_at(b"x", u64::MAX - 1), Err(BufferError::SizeTooBig));
        assert_eq!(stream.write_at(b"xyz", u64::MAX - 1), Err(BufferError::SizeTooBig));

        let stats = stream.stats();
        assert_eq!(stats.buffered, 0);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.growths, 0);

        stream.write_at(b"ok", 0).unwrap();
        assert_eq!(drain(&stream), b"ok");
    }

    #[test]
    fn test_empty_write_does_not_grow() {
        let stream = WriteAtStream::new();
        assert_eq!(stream.write_at(b"", 1 << 20).unwrap(), 0);

        let stats = stream.stats();
        assert_eq!(stats.buffered, 0);
        assert_eq!(stats.capacity, 0);
        assert_eq!(stats.growths, 0);

        stream.close();
        assert_eq!(stream.write_at(b"", 0), Err(BufferError::Closed));
    }

    #[test]
    fn test_compaction_reuses_allocation() {
        let stream = WriteAtStream::with_capacity(8);
        stream.write_at(b"abcdef", 0).unwrap();

        let mut buf = [0u8; 4];
        stream.read(&mut buf).unwrap();
        stream.write_at(b"ghij", 6).unwrap();

        let stats = stream.stats();
        assert_eq!(stats.growths, 0);
        assert_eq!(stats.buffered, 6);
        assert_eq!(drain(&stream), b"efghij");
    }

    #[test]
    fn test_from_vec_contents_not_readable() {
        let stream = WriteAtStream::from_vec(b"stale".to_vec());
        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).unwrap(), 0);

        stream.write_at(b"new", 0).unwrap();
        assert_eq!(drain(&stream), b"new");
    }

    #[test]
    fn test_io_read_adapter() {
        use std::io::Read;

        let stream = WriteAtStream::new();
        let mut buf = [0u8; 8];
        let err = Read::read(&mut &stream, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

        stream.write_at(b"done", 0).unwrap();
        stream.close();

        let mut out = Vec::new();
        (&stream).read_to_end(&mut out).unwrap();
        assert_eq!(out, b"done");
    }

    #[test]
    fn test_write_at_trait_maps_closed() {
        let stream = WriteAtStream::new();
        stream.close();
        let err = WriteAt::write_at(&stream, b"x", 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
