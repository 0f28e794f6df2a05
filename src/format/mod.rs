//! File format parsing.
//!
//! Only classic tiled TIFF (including GeoTIFF tags) is understood. Use
//! [`is_tiff_header`] for a cheap sniff before a full parse.

pub mod tiff;

/// Check whether the first bytes of a file look like a classic TIFF header.
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    matches!(bytes, [b'I', b'I', 42, 0, ..] | [b'M', b'M', 0, 42, ..])
}
