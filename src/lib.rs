// src/lib.rs
//! # Sequential Buffer Library
//!
//! In-memory buffers that turn irregular write patterns into well-behaved
//! sequential reads.
//!
//! Features:
//! - [`RollingLineBuffer`]: keeps the N most recent delimited records, hands
//!   out whole records forward-only, and reports when unread records were lost
//! - [`WriteAtStream`]: accepts writes at any offset in any order and reads
//!   back the gap-free front of the stream exactly once
//! - `std::io::Read` / `std::io::Write` adapters plus a [`WriteAt`] trait for
//!   positional writers
//! - Parallel chunked writes via [`chunked::write_in_chunks`]
//! - Secure memory zeroing of consumed and evicted data using `zeroize`
//!
//! Every operation is synchronous and non-blocking; each buffer is guarded by
//! a single mutex, so producers and a consumer can share it through `Arc`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunked;
pub mod error;
pub mod rolling;
pub mod stream;

// Re-export main types
pub use error::{BufferError, Result, ResultExt, ShortBufferError};
pub use rolling::{RollingConfig, RollingLineBuffer, RollingStats};
pub use stream::{RangeSet, StreamConfig, StreamStats, WriteAt, WriteAtStream};

/// Commonly used imports.
pub mod prelude {
    pub use crate::error::{BufferError, Result, ResultExt, ShortBufferError};
    pub use crate::rolling::{RollingConfig, RollingLineBuffer, RollingStats};
    pub use crate::stream::{StreamConfig, StreamStats, WriteAt, WriteAtStream};
}
