//! Classic TIFF structure parsing.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF files declare their endianness (II = little-endian, MM = big-endian)
//!   in the header. All multi-byte values must be read respecting this order.
//!
//! - **IFD (Image File Directory)**: A list of tags describing one image. Only the
//!   first IFD is read.
//!
//! - **Inline vs offset values**: Values of four bytes or less are stored inline in
//!   the IFD entry, larger values are stored at an offset pointed to by the entry.
//!
//! - **Tile grid**: Tiled images are cut into fixed-size tiles, addressed row-major
//!   through the `tile_offsets` and `tile_byte_counts` arrays.

mod directory;
mod geokeys;
mod grid;
mod header;
pub mod registry;
mod tags;
mod values;

pub use directory::{
    read_directory, read_directory_at, IfdEntry, Tag, TagCollection, IFD_COUNT_SIZE,
    IFD_ENTRY_SIZE,
};
pub use geokeys::{key_name, GeoKey, GeoKeyDirectory, GeoKeyValue, ModelType, RasterType};
pub use grid::{compute_grid, TileGrid};
pub use header::{read_header, ByteOrder, TiffHeader, TIFF_HEADER_SIZE};
pub use registry::{TagInfo, TAG_REGISTRY};
pub use tags::{Compression, FieldType, Predictor, SampleFormat, TiffTag};
pub use values::TagValue;
