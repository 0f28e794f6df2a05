//! Transport integration tests.
//!
//! Tests verify:
//! - A raster on local disk opens and decodes through FileRangeReader
//! - RetryReader recovers from transient failures and passes permanent ones through
//! - Inclusive range fetches validate their bounds

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use geotiff_streamer::{
    ByteOrder, ErrorKind, FileRangeReader, IoError, RangeReader, RetryPolicy, RetryReader,
    TiffError, TiledRaster,
};

use super::test_utils::{small_tiled_tiff, utm_geotiff, TrackingMockReader};

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
    }
}

// =============================================================================
// Flaky Reader
// =============================================================================

/// Wraps a reader and fails every `period`-th read with a connection error.
struct FlakyReader {
    inner: TrackingMockReader,
    period: usize,
    reads: AtomicUsize,
    failures: AtomicUsize,
}

impl FlakyReader {
    fn new(inner: TrackingMockReader, period: usize) -> Self {
        Self {
            inner,
            period,
            reads: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RangeReader for FlakyReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        if n % self.period == 0 {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(IoError::Connection("connection reset by peer".to_string()));
        }
        self.inner.read_exact_at(offset, len).await
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn identifier(&self) -> &str {
        self.inner.identifier()
    }
}

// =============================================================================
// FileRangeReader Tests
// =============================================================================

#[tokio::test]
async fn test_file_end_to_end() {
    let builder = utm_geotiff(ByteOrder::BigEndian);
    let expected = builder.expected_tile(4);
    let data = builder.build();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let reader = FileRangeReader::open(file.path()).await.unwrap();
    assert_eq!(reader.size(), data.len() as u64);
    assert!(reader.identifier().starts_with("file://"));

    let raster = TiledRaster::open(&reader).await.unwrap();
    assert_eq!(raster.geo_keys().and_then(|g| g.epsg()), Some(32610));

    let tile = raster.decode_tile_at(&reader, 1, 1).await.unwrap();
    assert_eq!(tile.index, 4);
    assert_eq!(tile.samples.as_u16().unwrap(), &expected[..]);
}

#[tokio::test]
async fn test_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.tif");

    let result = FileRangeReader::open(&path).await;
    assert!(matches!(result, Err(IoError::NotFound(_))));
}

#[tokio::test]
async fn test_file_too_small_for_header() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"II*\0").unwrap();
    file.flush().unwrap();

    let reader = FileRangeReader::open(file.path()).await.unwrap();
    let err = TiledRaster::open(&reader).await.unwrap_err();
    assert!(matches!(err, TiffError::Io(IoError::RangeOutOfBounds { .. })));
    assert_eq!(err.kind(), ErrorKind::Io);
}

// =============================================================================
// Inclusive Fetch Tests
// =============================================================================

#[tokio::test]
async fn test_fetch_is_inclusive() {
    let reader = TrackingMockReader::new((0u8..32).collect(), "mock://bytes");

    let bytes = reader.fetch(4, 7).await.unwrap();
    assert_eq!(&bytes[..], &[4, 5, 6, 7]);

    let single = reader.fetch(31, 31).await.unwrap();
    assert_eq!(&single[..], &[31]);

    assert_eq!(reader.get_requests().await, vec![(4, 4), (31, 1)]);
}

#[tokio::test]
async fn test_fetch_rejects_inverted_range() {
    let reader = TrackingMockReader::new(vec![0; 16], "mock://bytes");

    let result = reader.fetch(8, 3).await;
    assert!(matches!(
        result,
        Err(IoError::InvalidRange { start: 8, end: 3 })
    ));
    assert_eq!(reader.request_count(), 0);
}

#[tokio::test]
async fn test_fetch_past_end() {
    let reader = TrackingMockReader::new(vec![0; 16], "mock://bytes");

    let result = reader.fetch(10, 16).await;
    assert!(matches!(result, Err(IoError::RangeOutOfBounds { .. })));
}

// =============================================================================
// RetryReader Tests
// =============================================================================

#[tokio::test]
async fn test_retry_recovers_transient_failures() {
    let builder = small_tiled_tiff(ByteOrder::LittleEndian);
    let expected = builder.expected_tile(2);
    let inner = TrackingMockReader::new(builder.build(), "mock://flaky.tif");

    // Every other read fails once
    let reader = RetryReader::with_policy(FlakyReader::new(inner, 2), fast_policy(2));

    let raster = TiledRaster::open(&reader).await.unwrap();
    let tile = raster.decode_tile(&reader, 2).await.unwrap();

    assert_eq!(tile.samples.as_u16().unwrap(), &expected[..]);
    assert!(reader.inner().failures() > 0);
    assert_eq!(reader.identifier(), "mock://flaky.tif");
}

#[tokio::test]
async fn test_retry_gives_up() {
    let inner = TrackingMockReader::new(
        small_tiled_tiff(ByteOrder::LittleEndian).build(),
        "mock://down.tif",
    );
    // Every read fails
    let reader = RetryReader::with_policy(FlakyReader::new(inner, 1), fast_policy(3));

    let err = TiledRaster::open(&reader).await.unwrap_err();
    assert!(matches!(err, TiffError::Io(IoError::Connection(_))));
    // First attempt plus three retries
    assert_eq!(reader.inner().failures(), 4);
}

#[tokio::test]
async fn test_retry_skips_permanent_errors() {
    let inner = TrackingMockReader::new(vec![0; 4], "mock://tiny.tif");
    let reader = RetryReader::with_policy(inner, fast_policy(5));

    let result = reader.fetch(0, 7).await;
    assert!(matches!(result, Err(IoError::RangeOutOfBounds { .. })));
    assert_eq!(reader.inner().request_count(), 1);
}
