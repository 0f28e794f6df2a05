//! Tile decoding integration tests.
//!
//! Tests verify:
//! - Every tile decodes to its expected samples in both byte orders
//! - Each decode issues exactly one fetch, covering exactly the tile's bytes
//! - Unsupported encodings and bad indices fail before any tile fetch
//! - Corrupt or empty tiles fail without poisoning the raster

use std::sync::Arc;

use geotiff_streamer::{ByteOrder, ErrorKind, SampleType, TiffError, TiledRaster, TileSamples};

use super::test_utils::{
    encode_u16, small_tiled_tiff, zlib, TiffBuilder, TrackingMockReader,
};

/// Open a raster and clear the requests made while opening it.
async fn open(builder: TiffBuilder) -> (TrackingMockReader, TiledRaster) {
    let reader = TrackingMockReader::new(builder.build(), "mock://tiles.tif");
    let raster = TiledRaster::open(&reader).await.unwrap();
    reader.reset_tracking().await;
    (reader, raster)
}

// =============================================================================
// Basic Decoding Tests
// =============================================================================

#[tokio::test]
async fn test_decode_every_tile_both_byte_orders() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let expected = small_tiled_tiff(order);
        let (reader, raster) = open(small_tiled_tiff(order)).await;
        assert_eq!(raster.grid().tile_count(), 6);

        for index in 0..6 {
            let tile = raster.decode_tile(&reader, index).await.unwrap();

            assert_eq!(tile.index, index);
            assert_eq!(tile.sample_type(), SampleType::U16);
            assert_eq!(tile.shape(), (4, 4));
            assert_eq!(
                tile.samples.as_u16().unwrap(),
                &expected.expected_tile(index)[..],
                "tile {} ({:?})",
                index,
                order
            );
        }
        assert_eq!(reader.request_count(), 6);
    }
}

#[tokio::test]
async fn test_single_fetch_covers_exact_tile_span() {
    let (reader, raster) = open(small_tiled_tiff(ByteOrder::LittleEndian)).await;
    let offsets = raster.tags().tile_offsets().unwrap();
    let byte_counts = raster.tags().tile_byte_counts().unwrap();

    raster.decode_tile(&reader, 4).await.unwrap();

    let requests = reader.get_requests().await;
    assert_eq!(requests, vec![(offsets[4], byte_counts[4] as usize)]);
}

#[tokio::test]
async fn test_decode_by_position() {
    let builder = small_tiled_tiff(ByteOrder::BigEndian);
    let expected = builder.expected_tile(5);
    let (reader, raster) = open(builder).await;

    let tile = raster.decode_tile_at(&reader, 2, 1).await.unwrap();
    assert_eq!(tile.index, 5);
    assert_eq!(tile.samples.as_u16().unwrap(), &expected[..]);

    // Edge tile keeps its stored size; only 2x4 pixels lie inside the image
    assert_eq!(tile.shape(), (4, 4));
    assert_eq!(raster.grid().tile_dimensions(2, 1), Some((2, 4)));
    assert_eq!(raster.grid().tile_dimensions(0, 0), Some((4, 4)));
}

#[tokio::test]
async fn test_pixel_access_and_stats() {
    let (reader, raster) = open(small_tiled_tiff(ByteOrder::LittleEndian)).await;
    let tile = raster.decode_tile(&reader, 1).await.unwrap();

    assert_eq!(tile.get(0, 0, 0), Some(1000.0));
    assert_eq!(tile.get(3, 2, 0), Some(1011.0));
    assert_eq!(tile.get(4, 0, 0), None);
    assert_eq!(tile.row(1).unwrap(), vec![1004.0, 1005.0, 1006.0, 1007.0]);

    let stats = tile.stats().unwrap();
    assert_eq!(stats.min, 1000.0);
    assert_eq!(stats.max, 1015.0);
    assert_eq!(stats.mean, 1007.5);
}

#[tokio::test]
async fn test_multiple_samples_per_pixel() {
    let builder = TiffBuilder::new(8, 4, 4, 4).with_samples_per_pixel(3);
    let expected = builder.expected_tile(1);
    let (reader, raster) = open(builder).await;

    let tile = raster.decode_tile(&reader, 1).await.unwrap();
    assert_eq!(tile.shape(), (4, 12));
    assert_eq!(tile.samples.as_u16().unwrap(), &expected[..]);
    // Pixel (1, 0), third sample
    assert_eq!(tile.get(1, 0, 2), Some(1005.0));
}

// =============================================================================
// Encoding Variant Tests
// =============================================================================

#[tokio::test]
async fn test_horizontal_predictor() {
    for spp in [1u16, 3] {
        for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            let builder = TiffBuilder::new(8, 8, 4, 4)
                .with_byte_order(order)
                .with_samples_per_pixel(spp)
                .with_predictor(2);
            let expected: Vec<Vec<u16>> = (0..4).map(|i| builder.expected_tile(i)).collect();
            let (reader, raster) = open(builder).await;

            for (index, samples) in expected.iter().enumerate() {
                let tile = raster.decode_tile(&reader, index).await.unwrap();
                assert_eq!(
                    tile.samples.as_u16().unwrap(),
                    &samples[..],
                    "tile {} spp {}",
                    index,
                    spp
                );
            }
        }
    }
}

#[tokio::test]
async fn test_adobe_deflate() {
    let builder = small_tiled_tiff(ByteOrder::LittleEndian).with_compression(32946);
    let expected = builder.expected_tile(3);
    let (reader, raster) = open(builder).await;

    let tile = raster.decode_tile(&reader, 3).await.unwrap();
    assert_eq!(tile.samples.as_u16().unwrap(), &expected[..]);
}

#[tokio::test]
async fn test_u8_tiles() {
    let tiles: Vec<Vec<u8>> = (0..4u8)
        .map(|t| (0..16u8).map(|i| t * 50 + i).collect())
        .collect();
    let builder = TiffBuilder::new(8, 8, 4, 4)
        .with_sample_encoding(8, 1)
        .with_raw_tiles(tiles.clone());
    let (reader, raster) = open(builder).await;

    let tile = raster.decode_tile(&reader, 2).await.unwrap();
    assert_eq!(tile.sample_type(), SampleType::U8);
    assert_eq!(tile.samples.as_u8().unwrap(), &tiles[2][..]);
}

#[tokio::test]
async fn test_signed_and_float_tiles() {
    let signed: Vec<i16> = (0..16).map(|i| i * 10 - 80).collect();
    let raw: Vec<u8> = signed.iter().flat_map(|v| v.to_be_bytes()).collect();
    let builder = TiffBuilder::new(4, 4, 4, 4)
        .with_byte_order(ByteOrder::BigEndian)
        .with_sample_encoding(16, 2)
        .with_raw_tiles(vec![raw]);
    let (reader, raster) = open(builder).await;

    let tile = raster.decode_tile(&reader, 0).await.unwrap();
    assert_eq!(tile.samples, TileSamples::I16(signed));
    assert_eq!(tile.stats().unwrap().min, -80.0);

    let floats: Vec<f32> = (0..16).map(|i| i as f32 * 0.5 - 1.0).collect();
    let raw: Vec<u8> = floats.iter().flat_map(|v| v.to_le_bytes()).collect();
    let builder = TiffBuilder::new(4, 4, 4, 4)
        .with_sample_encoding(32, 3)
        .with_raw_tiles(vec![raw]);
    let (reader, raster) = open(builder).await;

    let tile = raster.decode_tile(&reader, 0).await.unwrap();
    assert_eq!(tile.sample_type(), SampleType::F32);
    assert_eq!(tile.samples.as_f32().unwrap(), &floats[..]);
    assert_eq!(tile.get(1, 0, 0), Some(-0.5));
}

// =============================================================================
// Rejection Tests (no tile fetch)
// =============================================================================

#[tokio::test]
async fn test_unsupported_compression() {
    let (reader, raster) =
        open(small_tiled_tiff(ByteOrder::LittleEndian).with_compression(5)).await;

    let err = raster.decode_tile(&reader, 0).await.unwrap_err();
    assert!(matches!(err, TiffError::UnsupportedCompression(5)));
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert_eq!(reader.request_count(), 0);
}

#[tokio::test]
async fn test_uncompressed_is_unsupported() {
    let (reader, raster) =
        open(small_tiled_tiff(ByteOrder::LittleEndian).with_compression(1)).await;

    let err = raster.decode_tile(&reader, 0).await.unwrap_err();
    assert!(matches!(err, TiffError::UnsupportedCompression(1)));
    assert_eq!(reader.request_count(), 0);
}

#[tokio::test]
async fn test_unsupported_sample_encoding() {
    let (reader, raster) =
        open(small_tiled_tiff(ByteOrder::LittleEndian).with_sample_encoding(12, 1)).await;

    let err = raster.decode_tile(&reader, 0).await.unwrap_err();
    assert!(matches!(
        err,
        TiffError::UnsupportedSampleFormat {
            bits_per_sample: 12,
            sample_format: 1
        }
    ));
    assert_eq!(reader.request_count(), 0);
}

#[tokio::test]
async fn test_unsupported_predictors() {
    let (reader, raster) =
        open(small_tiled_tiff(ByteOrder::LittleEndian).with_predictor(3)).await;
    let err = raster.decode_tile(&reader, 0).await.unwrap_err();
    assert!(matches!(err, TiffError::UnsupportedPredictor(3)));

    let float_tile: Vec<u8> = vec![0; 16 * 4];
    let builder = TiffBuilder::new(4, 4, 4, 4)
        .with_sample_encoding(32, 3)
        .with_raw_tiles(vec![float_tile])
        .with_predictor(2);
    let (reader, raster) = open(builder).await;
    let err = raster.decode_tile(&reader, 0).await.unwrap_err();
    assert!(matches!(err, TiffError::UnsupportedPredictor(2)));
    assert_eq!(reader.request_count(), 0);
}

#[tokio::test]
async fn test_tile_out_of_range() {
    let (reader, raster) = open(small_tiled_tiff(ByteOrder::LittleEndian)).await;

    let err = raster.decode_tile(&reader, 6).await.unwrap_err();
    assert!(matches!(err, TiffError::TileOutOfRange { index: 6, count: 6 }));
    assert_eq!(err.kind(), ErrorKind::OutOfRange);

    let err = raster.decode_tile_at(&reader, 3, 0).await.unwrap_err();
    assert!(matches!(err, TiffError::TileOutOfRange { index: 3, .. }));

    let err = raster.decode_tile_at(&reader, 0, 2).await.unwrap_err();
    assert!(matches!(err, TiffError::TileOutOfRange { index: 6, .. }));

    assert_eq!(reader.request_count(), 0);
}

// =============================================================================
// Corrupt Tile Tests
// =============================================================================

/// Six zlib tiles of the default pattern with `replace` applied to one of them.
fn stored_tiles(order: ByteOrder, index: usize, replacement: Vec<u8>) -> Vec<Vec<u8>> {
    let reference = small_tiled_tiff(order);
    (0..6)
        .map(|i| {
            if i == index {
                replacement.clone()
            } else {
                zlib(&encode_u16(order, &reference.expected_tile(i)))
            }
        })
        .collect()
}

#[tokio::test]
async fn test_empty_tile() {
    let order = ByteOrder::LittleEndian;
    let builder = small_tiled_tiff(order).with_stored_tiles(stored_tiles(order, 2, Vec::new()));
    let (reader, raster) = open(builder).await;

    let err = raster.decode_tile(&reader, 2).await.unwrap_err();
    assert!(matches!(err, TiffError::EmptyTile(2)));
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(reader.request_count(), 0);

    // Neighbouring tiles are unaffected
    let tile = raster.decode_tile(&reader, 3).await.unwrap();
    assert_eq!(tile.get(0, 0, 0), Some(3000.0));
}

#[tokio::test]
async fn test_corrupt_deflate_stream() {
    let order = ByteOrder::BigEndian;
    let garbage = b"definitely not a zlib stream".to_vec();
    let builder = small_tiled_tiff(order).with_stored_tiles(stored_tiles(order, 1, garbage));
    let (reader, raster) = open(builder).await;

    let err = raster.decode_tile(&reader, 1).await.unwrap_err();
    assert!(matches!(err, TiffError::Decompression { index: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::Decode);

    assert!(raster.decode_tile(&reader, 0).await.is_ok());
    assert!(raster.decode_tile(&reader, 2).await.is_ok());
}

#[tokio::test]
async fn test_short_tile() {
    let order = ByteOrder::LittleEndian;
    // Half a tile of u16 samples
    let short = zlib(&encode_u16(order, &[7; 8]));
    let builder = small_tiled_tiff(order).with_stored_tiles(stored_tiles(order, 4, short));
    let (reader, raster) = open(builder).await;

    let err = raster.decode_tile(&reader, 4).await.unwrap_err();
    assert!(matches!(
        err,
        TiffError::SizeMismatch {
            index: 4,
            expected: 32,
            actual: 16
        }
    ));
}

#[tokio::test]
async fn test_tile_past_end_of_file() {
    let mut data = small_tiled_tiff(ByteOrder::LittleEndian).build();
    data.truncate(data.len() - 3);
    let reader = TrackingMockReader::new(data, "mock://cut.tif");
    let raster = TiledRaster::open(&reader).await.unwrap();

    let err = raster.decode_tile(&reader, 5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(raster.decode_tile(&reader, 0).await.is_ok());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[tokio::test]
async fn test_concurrent_tile_decoding() {
    let builder = small_tiled_tiff(ByteOrder::BigEndian);
    let expected: Arc<Vec<Vec<u16>>> =
        Arc::new((0..6).map(|i| builder.expected_tile(i)).collect());
    let (reader, raster) = open(builder).await;
    let raster = Arc::new(raster);

    let mut handles = Vec::new();
    for round in 0..4 {
        for index in 0..6 {
            let raster = Arc::clone(&raster);
            let expected = Arc::clone(&expected);
            let reader = reader.clone();
            handles.push(tokio::spawn(async move {
                let target = (index + round) % 6;
                let tile = raster.decode_tile(&reader, target).await.unwrap();
                assert_eq!(tile.index, target);
                assert_eq!(
                    tile.samples.as_u16().unwrap(),
                    &expected[target][..],
                    "tile {}",
                    target
                );
            }));
        }
    }

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(reader.request_count(), 24);

    // Shared state is untouched by the concurrent decodes
    for (index, samples) in expected.iter().enumerate() {
        let tile = raster.decode_tile(&reader, index).await.unwrap();
        assert_eq!(tile.samples.as_u16().unwrap(), &samples[..]);
    }
}
