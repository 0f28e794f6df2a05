//! Tile fetch and decode.
//!
//! # Pipeline
//!
//! ```text
//! index ──► offset/byte count ──► fetch ──► inflate ──► size check
//!                                                          │
//!                    Tile (row-major) ◄── predictor ◄── samples (file byte order)
//! ```
//!
//! Everything that can be rejected from tags alone (index, compression,
//! sample encoding, planar configuration, predictor) is checked before any
//! byte of tile data is fetched.

use std::io::Read;

use flate2::read::ZlibDecoder;
use serde::Serialize;
use tracing::debug;

use crate::error::TiffError;
use crate::format::tiff::{ByteOrder, Compression, Predictor, TagCollection, TiffTag};
use crate::io::RangeReader;

use super::predictor::{resolve_predictor, rev_hpredict};

// =============================================================================
// SampleType
// =============================================================================

/// In-memory type of one decoded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    U8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Resolve `bits_per_sample` and `sample_format` to a sample type.
    ///
    /// # Errors
    /// `UnsupportedSampleFormat` for any other combination.
    pub fn from_encoding(bits_per_sample: u16, sample_format: u16) -> Result<Self, TiffError> {
        match (bits_per_sample, sample_format) {
            (8, 1) => Ok(SampleType::U8),
            (16, 1) => Ok(SampleType::U16),
            (16, 2) => Ok(SampleType::I16),
            (32, 1) => Ok(SampleType::U32),
            (32, 2) => Ok(SampleType::I32),
            (32, 3) => Ok(SampleType::F32),
            (64, 3) => Ok(SampleType::F64),
            _ => Err(TiffError::UnsupportedSampleFormat {
                bits_per_sample,
                sample_format,
            }),
        }
    }

    /// Size of one sample in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    pub const fn name(self) -> &'static str {
        match self {
            SampleType::U8 => "u8",
            SampleType::U16 => "u16",
            SampleType::I16 => "i16",
            SampleType::U32 => "u32",
            SampleType::I32 => "i32",
            SampleType::F32 => "f32",
            SampleType::F64 => "f64",
        }
    }
}

// =============================================================================
// TileSamples
// =============================================================================

/// Decoded samples of one tile, in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum TileSamples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl TileSamples {
    /// Decode raw bytes in the file's byte order.
    ///
    /// Trailing bytes that do not fill a whole sample are ignored.
    pub fn from_bytes(sample_type: SampleType, bytes: &[u8], order: ByteOrder) -> Self {
        let chunks = bytes.chunks_exact(sample_type.size_in_bytes());
        match sample_type {
            SampleType::U8 => TileSamples::U8(bytes.to_vec()),
            SampleType::U16 => TileSamples::U16(chunks.map(|c| order.read_u16(c)).collect()),
            SampleType::I16 => TileSamples::I16(chunks.map(|c| order.read_i16(c)).collect()),
            SampleType::U32 => TileSamples::U32(chunks.map(|c| order.read_u32(c)).collect()),
            SampleType::I32 => TileSamples::I32(chunks.map(|c| order.read_i32(c)).collect()),
            SampleType::F32 => TileSamples::F32(chunks.map(|c| order.read_f32(c)).collect()),
            SampleType::F64 => TileSamples::F64(chunks.map(|c| order.read_f64(c)).collect()),
        }
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            TileSamples::U8(_) => SampleType::U8,
            TileSamples::U16(_) => SampleType::U16,
            TileSamples::I16(_) => SampleType::I16,
            TileSamples::U32(_) => SampleType::U32,
            TileSamples::I32(_) => SampleType::I32,
            TileSamples::F32(_) => SampleType::F32,
            TileSamples::F64(_) => SampleType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TileSamples::U8(v) => v.len(),
            TileSamples::U16(v) => v.len(),
            TileSamples::I16(v) => v.len(),
            TileSamples::U32(v) => v.len(),
            TileSamples::I32(v) => v.len(),
            TileSamples::F32(v) => v.len(),
            TileSamples::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample `i` widened to `f64`.
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        match self {
            TileSamples::U8(v) => v.get(i).map(|&x| x as f64),
            TileSamples::U16(v) => v.get(i).map(|&x| x as f64),
            TileSamples::I16(v) => v.get(i).map(|&x| x as f64),
            TileSamples::U32(v) => v.get(i).map(|&x| x as f64),
            TileSamples::I32(v) => v.get(i).map(|&x| x as f64),
            TileSamples::F32(v) => v.get(i).map(|&x| x as f64),
            TileSamples::F64(v) => v.get(i).copied(),
        }
    }

    /// All samples widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.get_f64(i)).collect()
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            TileSamples::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&[u16]> {
        match self {
            TileSamples::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            TileSamples::F32(v) => Some(v),
            _ => None,
        }
    }

    fn rev_hpredict(&mut self, row_len: usize, samples_per_pixel: usize) {
        match self {
            TileSamples::U8(v) => rev_hpredict(v, row_len, samples_per_pixel),
            TileSamples::U16(v) => rev_hpredict(v, row_len, samples_per_pixel),
            TileSamples::I16(v) => rev_hpredict(v, row_len, samples_per_pixel),
            TileSamples::U32(v) => rev_hpredict(v, row_len, samples_per_pixel),
            TileSamples::I32(v) => rev_hpredict(v, row_len, samples_per_pixel),
            // Rejected by resolve_predictor
            TileSamples::F32(_) | TileSamples::F64(_) => {}
        }
    }
}

// =============================================================================
// Tile
// =============================================================================

/// Summary statistics over the samples of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// One decoded tile: `length` rows of `width * samples_per_pixel` samples.
///
/// Edge tiles keep their full stored size, including padding beyond the
/// image boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Linear tile index
    pub index: usize,
    /// Tile width in pixels
    pub width: u32,
    /// Tile height in pixels (number of rows)
    pub length: u32,
    pub samples_per_pixel: u16,
    pub samples: TileSamples,
}

impl Tile {
    /// Number of samples in one row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * self.samples_per_pixel as usize
    }

    /// Shape as `(rows, columns)` where a column is one sample.
    pub fn shape(&self) -> (usize, usize) {
        (self.length as usize, self.row_len())
    }

    pub fn sample_type(&self) -> SampleType {
        self.samples.sample_type()
    }

    /// Sample `sample` of the pixel at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32, sample: u16) -> Option<f64> {
        if x >= self.width || y >= self.length || sample >= self.samples_per_pixel {
            return None;
        }
        let i = y as usize * self.row_len()
            + x as usize * self.samples_per_pixel as usize
            + sample as usize;
        self.samples.get_f64(i)
    }

    /// Row `y` widened to `f64`.
    pub fn row(&self, y: u32) -> Option<Vec<f64>> {
        if y >= self.length {
            return None;
        }
        let start = y as usize * self.row_len();
        (start..start + self.row_len())
            .map(|i| self.samples.get_f64(i))
            .collect()
    }

    /// Min, max and mean over all samples, ignoring NaN.
    pub fn stats(&self) -> Option<SampleStats> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut n = 0usize;

        for value in (0..self.samples.len()).filter_map(|i| self.samples.get_f64(i)) {
            if value.is_nan() {
                continue;
            }
            min = min.min(value);
            max = max.max(value);
            sum += value;
            n += 1;
        }

        (n > 0).then(|| SampleStats {
            min,
            max,
            mean: sum / n as f64,
        })
    }
}

// =============================================================================
// Tile format
// =============================================================================

/// Everything needed to decode any tile of an IFD, resolved from its tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileFormat {
    pub compression: Compression,
    pub sample_type: SampleType,
    pub samples_per_pixel: u16,
    pub predictor: Predictor,
    pub tile_width: u32,
    pub tile_length: u32,
}

impl TileFormat {
    /// Validate the tags that govern tile decoding.
    ///
    /// Checks run in order: compression, sample encoding, planar
    /// configuration, predictor, tile dimensions.
    pub fn from_tags(tags: &TagCollection) -> Result<Self, TiffError> {
        let raw_compression = tags.compression()?;
        let compression = Compression::from_u16(raw_compression)
            .filter(|c| c.is_supported())
            .ok_or(TiffError::UnsupportedCompression(raw_compression))?;

        let bits_per_sample = tags.bits_per_sample()?;
        let sample_format = tags.sample_format()?;
        let sample_type = SampleType::from_encoding(bits_per_sample, sample_format)?;
        Self::check_uniform_bits(tags, bits_per_sample, sample_format)?;

        let samples_per_pixel = tags.samples_per_pixel()?;
        if samples_per_pixel == 0 {
            return Err(TiffError::ZeroDimension("samples_per_pixel"));
        }
        let planar = tags.planar_configuration()?;
        if planar != 1 && samples_per_pixel > 1 {
            return Err(TiffError::UnsupportedPlanarConfiguration(planar));
        }

        let predictor = resolve_predictor(tags.predictor()?, sample_type)?;

        let tile_width = tags.tile_width()?;
        let tile_length = tags.tile_length()?;
        if tile_width == 0 {
            return Err(TiffError::ZeroDimension("tile_width"));
        }
        if tile_length == 0 {
            return Err(TiffError::ZeroDimension("tile_length"));
        }

        Ok(TileFormat {
            compression,
            sample_type,
            samples_per_pixel,
            predictor,
            tile_width,
            tile_length,
        })
    }

    /// Mixed bit depths across samples have no single sample type.
    fn check_uniform_bits(
        tags: &TagCollection,
        bits_per_sample: u16,
        sample_format: u16,
    ) -> Result<(), TiffError> {
        let uniform = tags
            .value(TiffTag::BitsPerSample)
            .and_then(|v| v.to_u64_vec())
            .map_or(true, |bits| bits.iter().all(|&b| b == bits_per_sample as u64));
        if uniform {
            Ok(())
        } else {
            Err(TiffError::UnsupportedSampleFormat {
                bits_per_sample,
                sample_format,
            })
        }
    }

    /// Number of samples in one row of a tile.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.tile_width as usize * self.samples_per_pixel as usize
    }

    /// Byte size of one decompressed tile, `None` on overflow.
    pub fn tile_byte_len(&self) -> Option<usize> {
        self.row_len()
            .checked_mul(self.tile_length as usize)?
            .checked_mul(self.sample_type.size_in_bytes())
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Offset and byte count of tile `index`.
///
/// # Errors
/// `TileOutOfRange` if `index` is beyond either array.
pub fn tile_location(tags: &TagCollection, index: usize) -> Result<(u64, u64), TiffError> {
    let offsets = tags
        .value(TiffTag::TileOffsets)
        .ok_or(TiffError::MissingTag(TiffTag::TileOffsets.name()))?;
    let byte_counts = tags
        .value(TiffTag::TileByteCounts)
        .ok_or(TiffError::MissingTag(TiffTag::TileByteCounts.name()))?;

    let count = offsets.len().min(byte_counts.len());
    if index >= count {
        return Err(TiffError::TileOutOfRange { index, count });
    }

    let offset = offsets
        .get_u64(index)
        .ok_or_else(|| TiffError::InvalidTagValue {
            tag: TiffTag::TileOffsets.name(),
            message: format!("entry {} is not an unsigned integer", index),
        })?;
    let byte_count = byte_counts
        .get_u64(index)
        .ok_or_else(|| TiffError::InvalidTagValue {
            tag: TiffTag::TileByteCounts.name(),
            message: format!("entry {} is not an unsigned integer", index),
        })?;

    Ok((offset, byte_count))
}

/// Inflate a zlib stream of a tile expected to hold `expected` bytes.
///
/// Output stops at `expected + 1` bytes, so an oversized stream is still
/// reported as a size mismatch without being inflated in full.
pub fn inflate(data: &[u8], index: usize, expected: usize) -> Result<Vec<u8>, TiffError> {
    let limit = (expected as u64).saturating_add(1);
    let mut decoder = ZlibDecoder::new(data).take(limit);
    let mut decompressed = Vec::with_capacity(expected);
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| TiffError::Decompression {
            index,
            message: e.to_string(),
        })?;
    Ok(decompressed)
}

/// Fetch and decode tile `index` of the IFD described by `tags`.
///
/// Issues exactly one fetch, for `[offset, offset + byte_count - 1]`, and only
/// after the tile's tags have been validated.
pub async fn decode_tile<R: RangeReader + ?Sized>(
    reader: &R,
    tags: &TagCollection,
    index: usize,
) -> Result<Tile, TiffError> {
    let (offset, byte_count) = tile_location(tags, index)?;
    let format = TileFormat::from_tags(tags)?;
    decode_tile_with(reader, &format, tags.byte_order(), index, offset, byte_count).await
}

/// Decode a tile whose location and format are already resolved.
pub async fn decode_tile_with<R: RangeReader + ?Sized>(
    reader: &R,
    format: &TileFormat,
    byte_order: ByteOrder,
    index: usize,
    offset: u64,
    byte_count: u64,
) -> Result<Tile, TiffError> {
    if byte_count == 0 {
        return Err(TiffError::EmptyTile(index));
    }

    let expected = format
        .tile_byte_len()
        .ok_or_else(|| TiffError::InvalidTagValue {
            tag: TiffTag::TileWidth.name(),
            message: format!(
                "tile of {}x{} does not fit in memory",
                format.tile_width, format.tile_length
            ),
        })?;

    let compressed = reader.fetch(offset, offset + byte_count - 1).await?;
    let raw = inflate(&compressed, index, expected)?;

    if raw.len() != expected {
        return Err(TiffError::SizeMismatch {
            index,
            expected,
            actual: raw.len(),
        });
    }

    let mut samples = TileSamples::from_bytes(format.sample_type, &raw, byte_order);
    if format.predictor == Predictor::Horizontal {
        samples.rev_hpredict(format.row_len(), format.samples_per_pixel as usize);
    }

    debug!(
        resource = reader.identifier(),
        index,
        offset,
        compressed = byte_count,
        decompressed = raw.len(),
        compression = format.compression.name(),
        sample_type = format.sample_type.name(),
        "decoded tile"
    );

    Ok(Tile {
        index,
        width: format.tile_width,
        length: format.tile_length,
        samples_per_pixel: format.samples_per_pixel,
        samples,
    })
}

// =============================================================================
// Tests
// =============================================================================
