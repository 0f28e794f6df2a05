//! # GeoTIFF Streamer
//!
//! A partial decoder for tiled GeoTIFF rasters stored locally or in
//! S3-compatible object storage.
//!
//! It reads the header, the first tag directory and individual tiles using
//! byte-range requests, so a single tile of a multi-gigabyte raster costs a
//! handful of small reads instead of a full download.
//!
//! ## Features
//!
//! - **Range-based reads**: Every structure is fetched with an inclusive byte span
//! - **Full tag directory**: All tags are decoded and named from a static registry
//! - **Deflate tiles**: zlib-compressed tiles with optional horizontal predictor
//! - **GeoTIFF keys**: GeoKeyDirectory parsing with EPSG lookup
//!
//! ## Architecture
//!
//! - [`io`] - Range reader trait, file and S3 transports, retry layer
//! - [`mod@format`] - TIFF header, tag directory, tile grid and GeoKeys
//! - [`tile`] - Tile fetch, inflate and sample decoding
//! - [`raster`] - Opened raster combining all of the above
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use geotiff_streamer::{FileRangeReader, TiledRaster};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = FileRangeReader::open("dem.tif").await?;
//!     let raster = TiledRaster::open(&reader).await?;
//!
//!     let grid = raster.grid();
//!     println!("{} x {} tiles", grid.tiles_across, grid.tiles_down);
//!
//!     let tile = raster.decode_tile_at(&reader, 0, 0).await?;
//!     println!("tile shape: {:?}", tile.shape());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod raster;
pub mod tile;

// Re-export commonly used types
pub use config::{Cli, Command, InfoConfig, Source, SourceConfig, TileConfig, TileSelector};
pub use error::{ErrorKind, IoError, TiffError};
pub use format::is_tiff_header;
pub use format::tiff::{
    compute_grid, read_directory, read_header, ByteOrder, Compression, FieldType, GeoKey,
    GeoKeyDirectory, GeoKeyValue, IfdEntry, ModelType, RasterType, Tag, TagCollection, TagValue,
    TiffHeader, TiffTag, TileGrid, TAG_REGISTRY, TIFF_HEADER_SIZE,
};
pub use io::{
    create_s3_client, FileRangeReader, RangeReader, RetryPolicy, RetryReader, S3RangeReader,
};
pub use raster::TiledRaster;
pub use tile::{decode_tile, SampleStats, SampleType, Tile, TileFormat, TileSamples};
