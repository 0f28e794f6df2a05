//! Tile layout of a tiled image.
//!
//! Tiles are numbered row-major: index = row * tiles_across + column. Edge
//! tiles are stored at full tile size; only part of them lies inside the image.

use crate::error::TiffError;

use super::directory::TagCollection;

/// Geometry of the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    /// Image width in pixels
    pub image_width: u32,
    /// Image height in pixels
    pub image_length: u32,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_length: u32,
    /// Number of tile columns
    pub tiles_across: u32,
    /// Number of tile rows
    pub tiles_down: u32,
}

/// Integer ceiling of `a / b`. `b` must be non-zero.
#[inline]
fn ceil_div(a: u32, b: u32) -> u32 {
    a / b + u32::from(a % b != 0)
}

/// Compute the tile grid for an image.
///
/// # Errors
/// `ZeroDimension` if any argument is zero.
pub fn compute_grid(
    image_width: u32,
    image_length: u32,
    tile_width: u32,
    tile_length: u32,
) -> Result<TileGrid, TiffError> {
    for (value, name) in [
        (image_width, "image_width"),
        (image_length, "image_length"),
        (tile_width, "tile_width"),
        (tile_length, "tile_length"),
    ] {
        if value == 0 {
            return Err(TiffError::ZeroDimension(name));
        }
    }

    Ok(TileGrid {
        image_width,
        image_length,
        tile_width,
        tile_length,
        tiles_across: ceil_div(image_width, tile_width),
        tiles_down: ceil_div(image_length, tile_length),
    })
}

impl TileGrid {
    /// Build the grid from the dimension tags of a directory.
    pub fn from_tags(tags: &TagCollection) -> Result<Self, TiffError> {
        compute_grid(
            tags.image_width()?,
            tags.image_length()?,
            tags.tile_width()?,
            tags.tile_length()?,
        )
    }

    /// Total number of tiles.
    #[inline]
    pub fn tile_count(&self) -> u64 {
        self.tiles_across as u64 * self.tiles_down as u64
    }

    /// Linear index of the tile at column `x`, row `y`.
    ///
    /// Returns None if the coordinates are out of bounds.
    pub fn tile_index(&self, x: u32, y: u32) -> Option<u64> {
        if x >= self.tiles_across || y >= self.tiles_down {
            return None;
        }
        Some(y as u64 * self.tiles_across as u64 + x as u64)
    }

    /// Column and row of a linear tile index.
    pub fn tile_position(&self, index: u64) -> Option<(u32, u32)> {
        if index >= self.tile_count() {
            return None;
        }
        let across = self.tiles_across as u64;
        Some(((index % across) as u32, (index / across) as u32))
    }

    /// Pixel extent of the tile at (`x`, `y`) that lies inside the image.
    ///
    /// Edge tiles may be smaller than tile_width/tile_length.
    pub fn tile_dimensions(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        if x >= self.tiles_across || y >= self.tiles_down {
            return None;
        }

        let w = if x == self.tiles_across - 1 {
            match self.image_width % self.tile_width {
                0 => self.tile_width,
                remainder => remainder,
            }
        } else {
            self.tile_width
        };

        let h = if y == self.tiles_down - 1 {
            match self.image_length % self.tile_length {
                0 => self.tile_length,
                remainder => remainder,
            }
        } else {
            self.tile_length
        };

        Some((w, h))
    }
}
