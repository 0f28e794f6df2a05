//! Image File Directory parsing.
//!
//! # IFD Structure (classic TIFF)
//! ```text
//! Bytes 0-1:        Entry count N (u16)
//! Bytes 2..2+12N:   N entries of 12 bytes each
//! Bytes 2+12N..+4:  Offset of the next IFD (not read; only the first IFD is used)
//! ```
//!
//! # Entry Structure
//! ```text
//! Bytes 0-1:  Tag id
//! Bytes 2-3:  Field type code (1-12)
//! Bytes 4-7:  Value count
//! Bytes 8-11: Value itself if count * type size <= 4, else offset of the values
//! ```

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::TiffError;
use crate::io::RangeReader;

use super::header::{ByteOrder, TiffHeader};
use super::registry;
use super::tags::{FieldType, TiffTag};
use super::values::TagValue;

/// Size of one classic IFD entry in bytes.
pub const IFD_ENTRY_SIZE: usize = 12;

/// Size of the entry count field at the start of an IFD.
pub const IFD_COUNT_SIZE: usize = 2;

// =============================================================================
// IfdEntry
// =============================================================================

/// One raw 12-byte directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdEntry {
    /// Tag id
    pub tag_id: u16,
    /// Field type code as stored in the file
    pub field_type_raw: u16,
    /// Decoded field type
    pub field_type: FieldType,
    /// Number of values
    pub count: u32,
    /// Value slot: the value itself when inline, else an offset
    pub value_offset_bytes: [u8; 4],
}

impl IfdEntry {
    /// Decode an entry from 12 bytes.
    ///
    /// # Errors
    /// `UnknownFieldType` if the type code is outside 1-12.
    pub fn parse(bytes: &[u8], byte_order: ByteOrder) -> Result<Self, TiffError> {
        let tag_id = byte_order.read_u16(&bytes[0..2]);
        let field_type_raw = byte_order.read_u16(&bytes[2..4]);
        let count = byte_order.read_u32(&bytes[4..8]);

        let field_type =
            FieldType::from_u16(field_type_raw).ok_or(TiffError::UnknownFieldType {
                tag_id,
                field_type: field_type_raw,
            })?;

        let mut value_offset_bytes = [0u8; 4];
        value_offset_bytes.copy_from_slice(&bytes[8..12]);

        Ok(IfdEntry {
            tag_id,
            field_type_raw,
            field_type,
            count,
            value_offset_bytes,
        })
    }

    /// Whether the value is stored in the entry itself.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.field_type.fits_inline(self.count)
    }

    /// Total size of the value in bytes.
    #[inline]
    pub fn value_byte_len(&self) -> u64 {
        self.field_type.size_in_bytes() as u64 * self.count as u64
    }

    /// The value slot read as an offset.
    #[inline]
    pub fn value_offset(&self, byte_order: ByteOrder) -> u32 {
        byte_order.read_u32(&self.value_offset_bytes)
    }

    /// Decode the value, fetching it from the file when it is not inline.
    pub async fn read_value<R: RangeReader + ?Sized>(
        &self,
        reader: &R,
        byte_order: ByteOrder,
    ) -> Result<TagValue, TiffError> {
        let count = self.count as usize;

        if self.is_inline() {
            return Ok(TagValue::decode(
                self.field_type,
                count,
                &self.value_offset_bytes,
                byte_order,
            ));
        }

        let offset = self.value_offset(byte_order) as u64;
        let len = self.value_byte_len();
        let bytes = reader.fetch(offset, offset + len - 1).await?;

        Ok(TagValue::decode(self.field_type, count, &bytes, byte_order))
    }
}

// =============================================================================
// Tag / TagCollection
// =============================================================================

/// A directory entry with its resolved value.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// The raw entry
    pub entry: IfdEntry,
    /// Registry name, `None` for ids the registry does not know
    pub name: Option<&'static str>,
    /// Decoded value(s)
    pub value: TagValue,
}

impl Tag {
    #[inline]
    pub fn id(&self) -> u16 {
        self.entry.tag_id
    }

    /// Symbolic name of a scalar enumerated value, if the registry has one.
    pub fn value_name(&self) -> Option<&'static str> {
        let raw = self.value.as_u32()?;
        registry::lookup(self.id())?.value_name(raw)
    }
}

/// All tags of one IFD, addressable by id or registry name.
///
/// Built once by [`read_directory`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct TagCollection {
    byte_order: ByteOrder,
    tags: BTreeMap<u16, Tag>,
    names: HashMap<&'static str, u16>,
}

impl TagCollection {
    /// Create an empty collection for a file of the given byte order.
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            tags: BTreeMap::new(),
            names: HashMap::new(),
        }
    }

    /// Insert a tag. A later tag with the same id replaces the earlier one.
    pub fn insert(&mut self, tag: Tag) {
        if let Some(name) = tag.name {
            self.names.insert(name, tag.id());
        }
        self.tags.insert(tag.id(), tag);
    }

    /// Byte order of the file the tags came from.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, id: u16) -> bool {
        self.tags.contains_key(&id)
    }

    /// Look up a tag by numeric id.
    pub fn get(&self, id: u16) -> Option<&Tag> {
        self.tags.get(&id)
    }

    /// Look up a tag by registry name (e.g. `"tile_offsets"`).
    pub fn get_by_name(&self, name: &str) -> Option<&Tag> {
        self.names.get(name).and_then(|id| self.tags.get(id))
    }

    pub fn get_tag(&self, tag: TiffTag) -> Option<&Tag> {
        self.get(tag.as_u16())
    }

    pub fn value(&self, tag: TiffTag) -> Option<&TagValue> {
        self.get_tag(tag).map(|t| &t.value)
    }

    /// Tags in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    fn required_u32(&self, tag: TiffTag) -> Result<u32, TiffError> {
        let value = self.value(tag).ok_or(TiffError::MissingTag(tag.name()))?;
        value.as_u32().ok_or_else(|| TiffError::InvalidTagValue {
            tag: tag.name(),
            message: format!("expected a single unsigned integer, got {}", value),
        })
    }

    /// First element of the tag, or the registry default when absent.
    fn u16_or_default(&self, tag: TiffTag) -> Result<u16, TiffError> {
        let raw = match self.value(tag) {
            Some(value) => value.get_u64(0).ok_or_else(|| TiffError::InvalidTagValue {
                tag: tag.name(),
                message: format!("expected an unsigned integer, got {}", value),
            })?,
            None => registry::lookup(tag.as_u16())
                .and_then(|info| info.default)
                .ok_or(TiffError::MissingTag(tag.name()))? as u64,
        };

        u16::try_from(raw).map_err(|_| TiffError::InvalidTagValue {
            tag: tag.name(),
            message: format!("value {} does not fit in 16 bits", raw),
        })
    }

    fn required_u64_array(&self, tag: TiffTag) -> Result<Vec<u64>, TiffError> {
        let value = self.value(tag).ok_or(TiffError::MissingTag(tag.name()))?;
        value.to_u64_vec().ok_or_else(|| TiffError::InvalidTagValue {
            tag: tag.name(),
            message: format!("expected unsigned integers, got {:?}", value.field_type()),
        })
    }

    pub fn image_width(&self) -> Result<u32, TiffError> {
        self.required_u32(TiffTag::ImageWidth)
    }

    pub fn image_length(&self) -> Result<u32, TiffError> {
        self.required_u32(TiffTag::ImageLength)
    }

    pub fn tile_width(&self) -> Result<u32, TiffError> {
        self.required_u32(TiffTag::TileWidth)
    }

    pub fn tile_length(&self) -> Result<u32, TiffError> {
        self.required_u32(TiffTag::TileLength)
    }

    pub fn tile_offsets(&self) -> Result<Vec<u64>, TiffError> {
        self.required_u64_array(TiffTag::TileOffsets)
    }

    pub fn tile_byte_counts(&self) -> Result<Vec<u64>, TiffError> {
        self.required_u64_array(TiffTag::TileByteCounts)
    }

    /// Compression id (default 1, uncompressed).
    pub fn compression(&self) -> Result<u16, TiffError> {
        self.u16_or_default(TiffTag::Compression)
    }

    /// Bits of the first sample (default 1).
    pub fn bits_per_sample(&self) -> Result<u16, TiffError> {
        self.u16_or_default(TiffTag::BitsPerSample)
    }

    /// Sample format of the first sample (default 1, unsigned).
    pub fn sample_format(&self) -> Result<u16, TiffError> {
        self.u16_or_default(TiffTag::SampleFormat)
    }

    pub fn samples_per_pixel(&self) -> Result<u16, TiffError> {
        self.u16_or_default(TiffTag::SamplesPerPixel)
    }

    pub fn predictor(&self) -> Result<u16, TiffError> {
        self.u16_or_default(TiffTag::Predictor)
    }

    pub fn planar_configuration(&self) -> Result<u16, TiffError> {
        self.u16_or_default(TiffTag::PlanarConfiguration)
    }

    /// GeoTIFF ASCII parameters as one string.
    pub fn geo_ascii_params(&self) -> Option<String> {
        self.value(TiffTag::GeoAsciiParams)
            .and_then(TagValue::as_string)
    }
}

// =============================================================================
// Directory reading
// =============================================================================

/// Read the IFD at `header.first_ifd_offset` and resolve every entry.
///
/// Issues one fetch for the entry count, one for the entry table, and one per
/// entry whose value does not fit inline. Parsing stops at the first faulting
/// entry and no partial collection is returned.
pub async fn read_directory<R: RangeReader + ?Sized>(
    reader: &R,
    header: &TiffHeader,
) -> Result<TagCollection, TiffError> {
    read_directory_at(reader, header.first_ifd_offset as u64, header.byte_order).await
}

/// Read the IFD at an explicit offset.
pub async fn read_directory_at<R: RangeReader + ?Sized>(
    reader: &R,
    ifd_offset: u64,
    byte_order: ByteOrder,
) -> Result<TagCollection, TiffError> {
    let count_bytes = reader
        .fetch(ifd_offset, ifd_offset + IFD_COUNT_SIZE as u64 - 1)
        .await?;
    let entry_count = byte_order.read_u16(&count_bytes) as usize;

    if entry_count == 0 {
        return Err(TiffError::EmptyDirectory(ifd_offset));
    }

    let table_start = ifd_offset + IFD_COUNT_SIZE as u64;
    let table_len = (entry_count * IFD_ENTRY_SIZE) as u64;
    let table = reader.fetch(table_start, table_start + table_len - 1).await?;

    let mut tags = TagCollection::new(byte_order);
    let mut fetched = 0usize;

    for raw in table.chunks_exact(IFD_ENTRY_SIZE) {
        let entry = IfdEntry::parse(raw, byte_order)?;
        if !entry.is_inline() {
            fetched += 1;
        }

        let value = entry.read_value(reader, byte_order).await?;
        let name = registry::tag_name(entry.tag_id);
        if name.is_none() {
            debug!(tag_id = entry.tag_id, "retaining unregistered tag");
        }

        tags.insert(Tag { entry, name, value });
    }

    debug!(
        resource = reader.identifier(),
        ifd_offset,
        entries = entry_count,
        out_of_line = fetched,
        "parsed IFD"
    );

    Ok(tags)
}

// =============================================================================
// Tests
// =============================================================================
