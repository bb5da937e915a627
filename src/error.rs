// src/error.rs
//! Error types for buffer operations with io/anyhow conversion support

use std::fmt;
use std::io;

/// The destination handed to a rolling buffer read was too small to hold the
/// next unread record plus its delimiter.
///
/// Nothing is consumed when this is returned; retry with a destination of at
/// least [`needed`](Self::needed) bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortBufferError {
    needed: usize,
}

impl ShortBufferError {
    pub(crate) fn new(needed: usize) -> Self {
        Self { needed }
    }

    /// Minimum destination length for the next read to succeed.
    #[inline]
    pub fn needed(&self) -> usize {
        self.needed
    }

    /// Finds a `ShortBufferError` inside an [`io::Error`] produced by one of
    /// this crate's `io::Read` implementations.
    ///
    /// # Examples
    ///
    /// ```
    /// use seqbuf::prelude::*;
    /// use std::io::Read;
    ///
    /// let lines = RollingLineBuffer::new(4);
    /// lines.write(b"0123456789\n");
    ///
    /// let mut small = [0u8; 8];
    /// let err = Read::read(&mut &lines, &mut small).unwrap_err();
    /// assert_eq!(ShortBufferError::from_io(&err).map(|e| e.needed()), Some(11));
    /// ```
    pub fn from_io(err: &io::Error) -> Option<&ShortBufferError> {
        let inner = err.get_ref()?;
        if let Some(short) = inner.downcast_ref::<ShortBufferError>() {
            return Some(short);
        }
        match inner.downcast_ref::<BufferError>() {
            Some(BufferError::ShortBuffer(short)) => Some(short),
            _ => None,
        }
    }
}

impl fmt::Display for ShortBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "short buffer: need buffer at least length {}", self.needed)
    }
}

impl std::error::Error for ShortBufferError {}

/// Errors that can occur during buffer operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Destination too small for the next record
    ShortBuffer(ShortBufferError),
    /// Write attempted on a closed stream
    Closed,
    /// Stream is closed and every covered byte has been read
    EndOfStream,
    /// Write would need a buffer larger than can be addressed or allocated
    SizeTooBig,
    /// I/O error (for compatibility)
    Io(String),
}

impl BufferError {
    /// Returns `true` for the "destination too small" kind, whatever its size.
    #[inline]
    pub fn is_short_buffer(&self) -> bool {
        matches!(self, Self::ShortBuffer(_))
    }

    /// Minimum destination size carried by a short-buffer error.
    #[inline]
    pub fn needed(&self) -> Option<usize> {
        match self {
            Self::ShortBuffer(short) => Some(short.needed()),
            _ => None,
        }
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortBuffer(short) => write!(f, "{}", short),
            Self::Closed => write!(f, "Write to closed stream"),
            Self::EndOfStream => write!(f, "End of stream"),
            Self::SizeTooBig => write!(f, "Buffer size too big"),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ShortBuffer(short) => Some(short),
            _ => None,
        }
    }
}

impl From<ShortBufferError> for BufferError {
    fn from(err: ShortBufferError) -> Self {
        BufferError::ShortBuffer(err)
    }
}

// ============================================================================
// IO CONVERSION
// ============================================================================

/// Convert BufferError to std::io::Error
///
/// `EndOfStream` maps to `UnexpectedEof`; `io::Read` impls never produce it
/// and return `Ok(0)` instead.
impl From<BufferError> for io::Error {
    fn from(err: BufferError) -> Self {
        use io::ErrorKind;
        match err {
            BufferError::ShortBuffer(short) => io::Error::new(ErrorKind::InvalidInput, short),
            BufferError::Closed => io::Error::new(ErrorKind::BrokenPipe, err),
            BufferError::EndOfStream => io::Error::new(ErrorKind::UnexpectedEof, err),
            BufferError::SizeTooBig => io::Error::new(ErrorKind::OutOfMemory, err),
            BufferError::Io(msg) => io::Error::other(msg),
        }
    }
}

/// Convert std::io::Error to BufferError
impl From<io::Error> for BufferError {
    fn from(err: io::Error) -> Self {
        if let Some(short) = ShortBufferError::from_io(&err) {
            return BufferError::ShortBuffer(*short);
        }
        if let Some(inner) = err.get_ref().and_then(|e| e.downcast_ref::<BufferError>()) {
            return inner.clone();
        }
        BufferError::Io(err.to_string())
    }
}

/// Convert BufferError to anyhow::Error
#[cfg(feature = "anyhow")]
impl From<BufferError> for anyhow::Error {
    fn from(err: BufferError) -> Self {
        anyhow::Error::new(err)
    }
}

/// Result type alias for buffer operations
pub type Result<T> = std::result::Result<T, BufferError>;

/// Extension trait for converting Results between different error types
pub trait ResultExt<T> {
    /// Convert to anyhow::Result
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T>;

    /// Convert to io::Result
    fn into_io(self) -> io::Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| e.into())
    }

    fn into_io(self) -> io::Result<T> {
        self.map_err(|e| e.into())
    }
}
