//! Header and tag directory integration tests.
//!
//! Tests verify:
//! - Both byte orders parse to the same tags
//! - Inline values cost no extra fetch, out-of-line values exactly one each
//! - Malformed headers and directories fail with the right error kind
//! - GeoTIFF tags and keys resolve end to end

use geotiff_streamer::{
    read_directory, read_header, ByteOrder, ErrorKind, GeoKeyValue, ModelType, RasterType,
    TagValue, TiffError, TiledRaster,
};

use super::test_utils::{
    is_tiff_magic, small_tiled_tiff, utm_geotiff, TiffBuilder, TrackingMockReader, BYTE, LONG,
};

// =============================================================================
// Byte Order Tests
// =============================================================================

#[tokio::test]
async fn test_little_endian_tiff() {
    let data = small_tiled_tiff(ByteOrder::LittleEndian).build();
    assert_eq!(&data[0..2], b"II");
    assert!(is_tiff_magic(&data));

    let reader = TrackingMockReader::new(data, "mock://le.tif");
    let header = read_header(&reader).await.unwrap();

    assert_eq!(header.byte_order, ByteOrder::LittleEndian);
    assert_eq!(header.first_ifd_offset, 8);
}

#[tokio::test]
async fn test_big_endian_tiff() {
    let data = small_tiled_tiff(ByteOrder::BigEndian).build();
    assert_eq!(&data[0..2], b"MM");
    assert!(is_tiff_magic(&data));

    let reader = TrackingMockReader::new(data, "mock://be.tif");
    let header = read_header(&reader).await.unwrap();

    assert_eq!(header.byte_order, ByteOrder::BigEndian);
    assert_eq!(header.first_ifd_offset, 8);
}

#[tokio::test]
async fn test_both_byte_orders_produce_equivalent_tags() {
    let le = TrackingMockReader::new(utm_geotiff(ByteOrder::LittleEndian).build(), "mock://le");
    let be = TrackingMockReader::new(utm_geotiff(ByteOrder::BigEndian).build(), "mock://be");

    let le_tags = read_directory(&le, &read_header(&le).await.unwrap()).await.unwrap();
    let be_tags = read_directory(&be, &read_header(&be).await.unwrap()).await.unwrap();

    assert_eq!(le_tags.len(), be_tags.len());
    for (a, b) in le_tags.iter().zip(be_tags.iter()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.name, b.name);
        assert_eq!(a.value, b.value, "tag {} differs between byte orders", a.id());
    }
}

// =============================================================================
// Fetch Pattern Tests
// =============================================================================

#[tokio::test]
async fn test_directory_fetch_pattern() {
    let data = small_tiled_tiff(ByteOrder::LittleEndian).build();
    let reader = TrackingMockReader::new(data, "mock://fetch.tif");

    let header = read_header(&reader).await.unwrap();
    let tags = read_directory(&reader, &header).await.unwrap();

    // 10 tags: only tile_offsets and tile_byte_counts (6 LONGs each) are out of line
    assert_eq!(tags.len(), 10);
    let requests = reader.get_requests().await;
    assert_eq!(requests.len(), 5);
    assert_eq!(requests[0], (0, 8));
    assert_eq!(requests[1], (8, 2));
    assert_eq!(requests[2], (10, 120));
    assert_eq!(requests[3].1, 24);
    assert_eq!(requests[4].1, 24);
}

#[tokio::test]
async fn test_single_tile_offsets_are_inline() {
    let data = TiffBuilder::new(4, 4, 4, 4).build();
    let reader = TrackingMockReader::new(data, "mock://one-tile.tif");

    let header = read_header(&reader).await.unwrap();
    let tags = read_directory(&reader, &header).await.unwrap();

    assert_eq!(tags.tile_offsets().unwrap().len(), 1);
    // Header, count, entry table
    assert_eq!(reader.request_count(), 3);
}

#[tokio::test]
async fn test_open_does_not_fetch_tile_data() {
    let builder = small_tiled_tiff(ByteOrder::BigEndian);
    let data = builder.build();
    let reader = TrackingMockReader::new(data, "mock://open.tif");

    let raster = TiledRaster::open(&reader).await.unwrap();
    let first_tile = raster.tags().tile_offsets().unwrap()[0];

    for (offset, len) in reader.get_requests().await {
        assert!(
            offset + len as u64 <= first_tile,
            "open fetched [{}, {}) inside tile data",
            offset,
            offset + len as u64
        );
    }
}

// =============================================================================
// Tag Content Tests
// =============================================================================

#[tokio::test]
async fn test_tags_by_name_and_id() {
    let data = small_tiled_tiff(ByteOrder::LittleEndian).build();
    let reader = TrackingMockReader::new(data, "mock://tags.tif");
    let raster = TiledRaster::open(&reader).await.unwrap();
    let tags = raster.tags();

    assert_eq!(tags.image_width().unwrap(), 10);
    assert_eq!(tags.image_length().unwrap(), 8);
    assert_eq!(tags.get_by_name("tile_width").unwrap().value.as_u32(), Some(4));
    assert_eq!(tags.get(323).unwrap().name, Some("tile_length"));
    assert_eq!(tags.compression().unwrap(), 8);
    assert_eq!(tags.bits_per_sample().unwrap(), 16);
    assert_eq!(tags.tile_byte_counts().unwrap().len(), 6);

    // Absent tags resolve to registry defaults
    assert!(tags.get_by_name("planar_configuration").is_none());
    assert_eq!(tags.planar_configuration().unwrap(), 1);
    assert_eq!(tags.predictor().unwrap(), 1);
}

#[tokio::test]
async fn test_unknown_and_small_array_tags() {
    let data = small_tiled_tiff(ByteOrder::BigEndian)
        .with_tag(60000, BYTE, 3, vec![7, 8, 9])
        .with_tag(60001, LONG, 1, vec![0, 0, 1, 0])
        .build();
    let reader = TrackingMockReader::new(data, "mock://unknown.tif");
    let raster = TiledRaster::open(&reader).await.unwrap();

    let bytes = raster.tags().get(60000).unwrap();
    assert_eq!(bytes.name, None);
    assert_eq!(bytes.value, TagValue::Byte(vec![7, 8, 9]));
    assert_eq!(raster.tags().get(60001).unwrap().value.as_u32(), Some(256));
}

#[tokio::test]
async fn test_geotiff_tags_and_keys() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let data = utm_geotiff(order).build();
        let reader = TrackingMockReader::new(data, "mock://utm.tif");
        let raster = TiledRaster::open(&reader).await.unwrap();
        let tags = raster.tags();

        assert_eq!(
            tags.get_by_name("model_pixel_scale").unwrap().value,
            TagValue::Double(vec![30.0, 30.0, 0.0])
        );
        assert_eq!(
            tags.get_by_name("model_tie_point").unwrap().value.to_f64_vec().unwrap()[3],
            500000.0
        );
        assert_eq!(
            tags.geo_ascii_params().as_deref(),
            Some("WGS 84 / UTM zone 10N|")
        );
        assert_eq!(
            tags.get_by_name("gdal_nodata").unwrap().value.as_string().as_deref(),
            Some("-9999")
        );

        let geo = raster.geo_keys().expect("geo keys");
        assert_eq!(geo.model_type(), Some(ModelType::Projected));
        assert_eq!(geo.raster_type(), Some(RasterType::PixelIsArea));
        assert_eq!(geo.epsg(), Some(32610));
        assert_eq!(
            geo.get(1026).unwrap().value,
            GeoKeyValue::Ascii("WGS 84 / UTM zone 10N".to_string())
        );
    }
}

#[tokio::test]
async fn test_malformed_geokeys_do_not_fail_open() {
    // Key 1026 points past the end of geo_ascii_params
    let data = small_tiled_tiff(ByteOrder::LittleEndian)
        .with_shorts(34735, &[1, 1, 0, 1, 1026, 34737, 50, 0])
        .with_ascii(34737, "short|")
        .build();
    let reader = TrackingMockReader::new(data, "mock://badkeys.tif");

    let raster = TiledRaster::open(&reader).await.unwrap();
    assert!(raster.geo_keys().is_none());
    assert_eq!(raster.grid().tile_count(), 6);
}

// =============================================================================
// Error Tests
// =============================================================================

#[tokio::test]
async fn test_not_a_tiff() {
    let mut data = small_tiled_tiff(ByteOrder::LittleEndian).build();
    data[0] = b'X';
    let reader = TrackingMockReader::new(data, "mock://bad.tif");

    let err = TiledRaster::open(&reader).await.unwrap_err();
    assert!(matches!(err, TiffError::InvalidByteOrder(_)));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[tokio::test]
async fn test_bad_magic() {
    let mut data = small_tiled_tiff(ByteOrder::LittleEndian).build();
    data[2] = 0x2C;
    let reader = TrackingMockReader::new(data, "mock://magic.tif");

    let err = TiledRaster::open(&reader).await.unwrap_err();
    assert!(matches!(err, TiffError::InvalidVersion(44)));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[tokio::test]
async fn test_bigtiff_rejected() {
    let mut data = small_tiled_tiff(ByteOrder::BigEndian).build();
    data[3] = 0x2B;
    let reader = TrackingMockReader::new(data, "mock://big.tif");

    let err = TiledRaster::open(&reader).await.unwrap_err();
    assert!(matches!(err, TiffError::BigTiff));
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    // Only the header was read
    assert_eq!(reader.request_count(), 1);
}

#[tokio::test]
async fn test_truncated_file() {
    let data = small_tiled_tiff(ByteOrder::LittleEndian).build();
    let reader = TrackingMockReader::new(data[..4].to_vec(), "mock://trunc.tif");

    let err = TiledRaster::open(&reader).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[tokio::test]
async fn test_truncated_directory() {
    let data = small_tiled_tiff(ByteOrder::LittleEndian).build();
    // Cut inside the entry table
    let reader = TrackingMockReader::new(data[..40].to_vec(), "mock://trunc-ifd.tif");

    let err = TiledRaster::open(&reader).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[tokio::test]
async fn test_invalid_field_type() {
    let mut data = small_tiled_tiff(ByteOrder::LittleEndian).build();
    // Type code of the first entry
    data[12] = 0x0E;
    let reader = TrackingMockReader::new(data, "mock://type.tif");

    let err = TiledRaster::open(&reader).await.unwrap_err();
    assert!(matches!(
        err,
        TiffError::UnknownFieldType {
            tag_id: 256,
            field_type: 14
        }
    ));
}

#[tokio::test]
async fn test_zero_tile_width() {
    let data = small_tiled_tiff(ByteOrder::LittleEndian)
        .with_tag(322, LONG, 1, vec![0, 0, 0, 0])
        .build();
    let reader = TrackingMockReader::new(data, "mock://zero.tif");

    let err = TiledRaster::open(&reader).await.unwrap_err();
    assert!(matches!(err, TiffError::ZeroDimension("tile_width")));
    assert_eq!(err.kind(), ErrorKind::Format);
}
