use async_trait::async_trait;
use bytes::Bytes;

use crate::error::IoError;

/// Trait for reading byte ranges from a random-access resource.
///
/// This abstraction allows the TIFF parser and tile decoder to work with
/// rasters without downloading them entirely. Implementations must be
/// thread-safe so tiles can be fetched from concurrent tasks.
#[async_trait]
pub trait RangeReader: Send + Sync {
    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Returns an error if the range is out of bounds or if the read fails.
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError>;

    /// Fetch the inclusive byte span `[start, end]`.
    ///
    /// The returned buffer is always `end - start + 1` bytes long. A transport
    /// that hands back a different length is reported as a short read.
    async fn fetch(&self, start: u64, end: u64) -> Result<Bytes, IoError> {
        if start > end {
            return Err(IoError::InvalidRange { start, end });
        }

        let expected = end - start + 1;
        let bytes = self.read_exact_at(start, expected as usize).await?;

        if bytes.len() as u64 != expected {
            return Err(IoError::ShortRead {
                offset: start,
                expected,
                actual: bytes.len() as u64,
            });
        }

        Ok(bytes)
    }

    /// Get the total size of the resource in bytes.
    fn size(&self) -> u64;

    /// Get a unique identifier for this resource (for logging).
    ///
    /// For S3, this would typically be `s3://bucket/key`.
    fn identifier(&self) -> &str;
}

/// Check that `[offset, offset + len)` lies within a resource of `size` bytes.
pub(crate) fn check_bounds(offset: u64, len: usize, size: u64) -> Result<(), IoError> {
    match offset.checked_add(len as u64) {
        Some(end) if end <= size => Ok(()),
        _ => Err(IoError::RangeOutOfBounds {
            offset,
            requested: len as u64,
            size,
        }),
    }
}
