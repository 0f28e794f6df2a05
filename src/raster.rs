//! Opened tiled raster.
//!
//! [`TiledRaster`] holds everything parsed when a raster is opened (header,
//! first IFD, tile grid, GeoKeys) and decodes tiles on demand. It does not own
//! the reader, so one opened raster can serve tiles to many concurrent tasks
//! sharing the same `&R`.

use tracing::{debug, info, warn};

use crate::error::TiffError;
use crate::format::tiff::{
    read_directory, read_header, GeoKeyDirectory, TagCollection, TiffHeader, TiffTag, TileGrid,
};
use crate::io::RangeReader;
use crate::tile::{decode_tile, Tile};

/// Metadata of an opened tiled TIFF.
#[derive(Debug, Clone)]
pub struct TiledRaster {
    header: TiffHeader,
    tags: TagCollection,
    grid: TileGrid,
    geo_keys: Option<GeoKeyDirectory>,
}

impl TiledRaster {
    /// Parse the header, first IFD and tile grid of `reader`.
    ///
    /// Fails on the first structural error. A malformed GeoKey directory is
    /// logged and ignored since tiles can still be decoded without it.
    pub async fn open<R: RangeReader + ?Sized>(reader: &R) -> Result<Self, TiffError> {
        let header = read_header(reader).await?;
        let tags = read_directory(reader, &header).await?;
        let grid = TileGrid::from_tags(&tags)?;

        let geo_keys = match GeoKeyDirectory::from_tags(&tags) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(resource = reader.identifier(), error = %e, "ignoring GeoKey directory");
                None
            }
        };

        let offsets = tags.value(TiffTag::TileOffsets).map(|v| v.len());
        if let Some(count) = offsets {
            if count as u64 != grid.tile_count() {
                warn!(
                    resource = reader.identifier(),
                    tile_offsets = count,
                    grid_tiles = grid.tile_count(),
                    "tile offset count does not match tile grid"
                );
            }
        }

        info!(
            resource = reader.identifier(),
            width = grid.image_width,
            height = grid.image_length,
            tile_width = grid.tile_width,
            tile_length = grid.tile_length,
            tiles_across = grid.tiles_across,
            tiles_down = grid.tiles_down,
            tags = tags.len(),
            "opened tiled raster"
        );
        if let Some(epsg) = geo_keys.as_ref().and_then(GeoKeyDirectory::epsg) {
            debug!(resource = reader.identifier(), epsg, "raster CRS");
        }

        Ok(TiledRaster {
            header,
            tags,
            grid,
            geo_keys,
        })
    }

    pub fn header(&self) -> &TiffHeader {
        &self.header
    }

    pub fn tags(&self) -> &TagCollection {
        &self.tags
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// GeoTIFF keys, if the raster has a valid key directory.
    pub fn geo_keys(&self) -> Option<&GeoKeyDirectory> {
        self.geo_keys.as_ref()
    }

    /// Decode tile `index` (row-major).
    ///
    /// A failing tile leaves the raster usable for other tiles.
    pub async fn decode_tile<R: RangeReader + ?Sized>(
        &self,
        reader: &R,
        index: usize,
    ) -> Result<Tile, TiffError> {
        decode_tile(reader, &self.tags, index).await
    }

    /// Decode the tile at column `x`, row `y`.
    pub async fn decode_tile_at<R: RangeReader + ?Sized>(
        &self,
        reader: &R,
        x: u32,
        y: u32,
    ) -> Result<Tile, TiffError> {
        let index = self
            .grid
            .tile_index(x, y)
            .ok_or(TiffError::TileOutOfRange {
                index: self.out_of_grid_index(x, y),
                count: self.grid.tile_count() as usize,
            })?;
        self.decode_tile(reader, index as usize).await
    }

    /// Linear index a coordinate would have if the grid extended to it.
    fn out_of_grid_index(&self, x: u32, y: u32) -> usize {
        (y as u64)
            .saturating_mul(self.grid.tiles_across as u64)
            .saturating_add(x as u64) as usize
    }
}
