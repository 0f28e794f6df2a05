//! Tile decoding.
//!
//! Turns one entry of the `tile_offsets`/`tile_byte_counts` arrays into a
//! row-major array of samples:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              TagCollection              │
//! └────────────────────┬────────────────────┘
//!                      │ TileFormat::from_tags
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               decode_tile               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │   inflate    │  │    predictor    │  │
//! │  │   (zlib)     │  │  (horizontal)   │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │                  Tile                   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`decode_tile`]: Fetch, inflate and decode one tile by index
//! - [`TileFormat`]: Compression, sample type and predictor resolved from tags
//! - [`Tile`] / [`TileSamples`]: Decoded samples and their shape
//!
//! Tiles are produced per call and never cached.

mod decoder;
pub mod predictor;

pub use decoder::{
    decode_tile, decode_tile_with, inflate, tile_location, SampleStats, SampleType, Tile,
    TileFormat, TileSamples,
};
