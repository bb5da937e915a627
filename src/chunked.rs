// src/chunked.rs
//! Parallel chunked writes into any [`WriteAt`] target.
//!
//! Splits a payload into fixed-size chunks and writes them from scoped worker
//! threads, so chunks land in whatever order the scheduler picks. Useful for
//! reassembly pipelines and for exercising out-of-order writers.

use crate::stream::WriteAt;
use std::io;

/// Upper bound on worker threads spawned per call.
pub const MAX_CHUNK_WORKERS: usize = 64;

/// Writes `data` at stream offset `base` in `chunk_size` pieces, concurrently.
///
/// Worker `k` writes chunks `k`, `k + workers`, `k + 2 * workers`, ... where
/// `workers` is the chunk count capped at [`MAX_CHUNK_WORKERS`]. Returns the
/// number of bytes written, which is `data.len()` on success.
///
/// # Errors
///
/// - [`io::ErrorKind::InvalidInput`] if `chunk_size` is zero.
/// - The first error returned by the target, after all workers have finished.
/// - [`io::ErrorKind::Other`] if a worker panicked.
///
/// # Example
///
/// ```rust
/// use seqbuf::prelude::*;
/// use seqbuf::chunked::write_in_chunks;
///
/// let stream = WriteAtStream::new();
/// write_in_chunks(&stream, b"hello world", 0, 2)?;
///
/// let mut out = [0u8; 11];
/// assert_eq!(stream.read(&mut out)?, 11);
/// assert_eq!(&out, b"hello world");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_in_chunks<W>(target: &W, data: &[u8], base: u64, chunk_size: usize) -> io::Result<usize>
where
    W: WriteAt + Sync + ?Sized,
{
    if chunk_size == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "chunk size must be non-zero",
        ));
    }
    if data.is_empty() {
        return Ok(0);
    }

    let chunks = data.len().div_ceil(chunk_size);
    let workers = chunks.min(MAX_CHUNK_WORKERS);
    tracing::trace!(len = data.len(), chunks, workers, base, "chunked write");

    let results = crossbeam::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                scope.spawn(move |_| -> io::Result<usize> {
                    let mut written = 0;
                    for (index, chunk) in data
                        .chunks(chunk_size)
                        .enumerate()
                        .skip(worker)
                        .step_by(workers)
                    {
                        let offset = base + (index * chunk_size) as u64;
                        target.write_all_at(chunk, offset)?;
                        written += chunk.len();
                    }
                    Ok(written)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("chunk writer panicked")))
            })
            .collect::<Vec<_>>()
    })
    .map_err(|_| io::Error::other("chunk writer panicked"))?;

    results.into_iter().sum()
}
