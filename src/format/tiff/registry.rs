//! Static registry of known TIFF tags.
//!
//! Maps a 16-bit tag id to its semantic name, default value, declared field
//! type, expected count and, for enumerated tags, the symbolic names of raw
//! values. The table is immutable process-wide data sorted by id.
//!
//! The registry describes tags; it does not filter them. Ids missing from
//! the table are kept by the directory parser under their numeric id.

use super::tags::FieldType;

/// Description of one known tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    /// Numeric tag id
    pub id: u16,
    /// Semantic snake_case name
    pub name: &'static str,
    /// Value assumed when the tag is absent
    pub default: Option<u32>,
    /// Declared field type, if the tag has a canonical one
    pub field_type: Option<FieldType>,
    /// Expected number of values, if fixed
    pub count: Option<u32>,
    /// Symbolic names for enumerated raw values
    pub values: &'static [(u32, &'static str)],
}

impl TagInfo {
    /// Symbolic name for a raw enumerated value.
    pub fn value_name(&self, raw: u32) -> Option<&'static str> {
        self.values
            .iter()
            .find(|(value, _)| *value == raw)
            .map(|(_, name)| *name)
    }
}

const fn tag(
    id: u16,
    name: &'static str,
    default: Option<u32>,
    field_type: Option<FieldType>,
    count: Option<u32>,
    values: &'static [(u32, &'static str)],
) -> TagInfo {
    TagInfo {
        id,
        name,
        default,
        field_type,
        count,
        values,
    }
}

use super::tags::FieldType::{Ascii, Byte, Double, Long, Rational, Short, Undefined};

const NONE: &[(u32, &str)] = &[];

/// All known tags, sorted by id.
pub static TAG_REGISTRY: &[TagInfo] = &[
    tag(254, "new_subfile_type", Some(0), Some(Long), Some(1), NONE),
    tag(
        255,
        "subfile_type",
        None,
        Some(Short),
        Some(1),
        &[(0, "undefined"), (1, "image"), (2, "reduced_image"), (3, "page")],
    ),
    tag(256, "image_width", None, Some(Long), Some(1), NONE),
    tag(257, "image_length", None, Some(Long), Some(1), NONE),
    tag(258, "bits_per_sample", Some(1), Some(Short), Some(1), NONE),
    tag(259, "compression", Some(1), Some(Short), Some(1), NONE),
    tag(262, "photometric", None, Some(Short), Some(1), NONE),
    tag(
        266,
        "fill_order",
        Some(1),
        Some(Short),
        Some(1),
        &[(1, "msb2lsb"), (2, "lsb2msb")],
    ),
    tag(269, "document_name", None, Some(Ascii), None, NONE),
    tag(270, "image_description", None, Some(Ascii), None, NONE),
    tag(271, "make", None, Some(Ascii), None, NONE),
    tag(272, "model", None, Some(Ascii), None, NONE),
    tag(273, "strip_offsets", None, Some(Long), None, NONE),
    tag(274, "orientation", Some(1), Some(Short), Some(1), NONE),
    tag(277, "samples_per_pixel", Some(1), Some(Short), Some(1), NONE),
    tag(278, "rows_per_strip", Some(u32::MAX), Some(Long), Some(1), NONE),
    tag(279, "strip_byte_counts", None, Some(Long), None, NONE),
    tag(280, "min_sample_value", None, Some(Short), None, NONE),
    tag(281, "max_sample_value", None, Some(Short), None, NONE),
    tag(282, "x_resolution", None, Some(Rational), Some(1), NONE),
    tag(283, "y_resolution", None, Some(Rational), Some(1), NONE),
    tag(
        284,
        "planar_configuration",
        Some(1),
        Some(Short),
        Some(1),
        &[(1, "contig"), (2, "separate")],
    ),
    tag(285, "page_name", None, Some(Ascii), None, NONE),
    tag(286, "x_position", None, Some(Rational), Some(1), NONE),
    tag(287, "y_position", None, Some(Rational), Some(1), NONE),
    tag(
        296,
        "resolution_unit",
        Some(2),
        Some(Long),
        Some(1),
        &[(1, "none"), (2, "inch"), (3, "centimeter")],
    ),
    tag(297, "page_number", None, Some(Short), Some(2), NONE),
    tag(305, "software", None, Some(Ascii), None, NONE),
    tag(306, "datetime", None, Some(Ascii), None, NONE),
    tag(315, "artist", None, Some(Ascii), None, NONE),
    tag(316, "host_computer", None, Some(Ascii), None, NONE),
    tag(
        317,
        "predictor",
        Some(1),
        Some(Short),
        Some(1),
        &[(1, "none"), (2, "horizontal"), (3, "float")],
    ),
    tag(318, "white_point", None, Some(Rational), Some(2), NONE),
    tag(319, "primary_chromaticities", None, Some(Rational), Some(6), NONE),
    tag(320, "color_map", None, Some(Short), None, NONE),
    tag(322, "tile_width", None, Some(Long), Some(1), NONE),
    tag(323, "tile_length", None, Some(Long), Some(1), NONE),
    tag(324, "tile_offsets", None, Some(Long), None, NONE),
    tag(325, "tile_byte_counts", None, Some(Long), None, NONE),
    tag(
        338,
        "extra_samples",
        None,
        Some(Short),
        None,
        &[(0, "unspecified"), (1, "assocalpha"), (2, "unassalpha")],
    ),
    tag(339, "sample_format", Some(1), Some(Short), Some(1), NONE),
    tag(340, "smin_sample_value", None, None, None, NONE),
    tag(341, "smax_sample_value", None, None, None, NONE),
    tag(347, "jpeg_tables", None, Some(Undefined), None, NONE),
    tag(530, "ycbcr_subsampling", Some(1), Some(Short), Some(2), NONE),
    tag(531, "ycbcr_positioning", Some(1), Some(Short), Some(1), NONE),
    // 32996 was historically also "sgi_matteing"; extra_samples replaces it
    tag(32996, "sgi_datatype", None, None, Some(1), NONE),
    tag(32997, "image_depth", None, Some(Long), Some(1), NONE),
    tag(32998, "tile_depth", None, Some(Long), Some(1), NONE),
    tag(33432, "copyright", None, Some(Byte), None, NONE),
    tag(33445, "md_file_tag", None, Some(Long), Some(1), NONE),
    tag(33446, "md_scale_pixel", None, Some(Rational), Some(1), NONE),
    tag(33447, "md_color_table", None, Some(Short), None, NONE),
    tag(33448, "md_lab_name", None, Some(Ascii), None, NONE),
    tag(33449, "md_sample_info", None, Some(Ascii), None, NONE),
    tag(33450, "md_prep_date", None, Some(Ascii), None, NONE),
    tag(33451, "md_prep_time", None, Some(Ascii), None, NONE),
    tag(33452, "md_file_units", None, Some(Ascii), None, NONE),
    tag(33550, "model_pixel_scale", None, Some(Double), Some(3), NONE),
    tag(33922, "model_tie_point", None, Some(Double), None, NONE),
    tag(34665, "exif_ifd", None, None, Some(1), NONE),
    tag(34735, "geo_key_directory", None, Some(Short), None, NONE),
    tag(34736, "geo_double_params", None, Some(Double), None, NONE),
    tag(34737, "geo_ascii_params", None, Some(Ascii), None, NONE),
    tag(34853, "gps_ifd", None, None, Some(1), NONE),
    tag(37510, "user_comment", None, None, None, NONE),
    tag(42112, "gdal_metadata", None, Some(Ascii), None, NONE),
    tag(42113, "gdal_nodata", None, Some(Ascii), None, NONE),
    tag(50289, "mc_xy_position", None, Some(Double), Some(2), NONE),
    tag(50290, "mc_z_position", None, Some(Double), Some(1), NONE),
    tag(50291, "mc_xy_calibration", None, Some(Double), Some(3), NONE),
    tag(50292, "mc_lens_lem_na_n", None, Some(Double), Some(3), NONE),
    tag(50293, "mc_channel_name", None, Some(Byte), None, NONE),
    tag(50294, "mc_ex_wavelength", None, Some(Double), Some(1), NONE),
    tag(50295, "mc_time_stamp", None, Some(Double), Some(1), NONE),
    tag(50838, "imagej_byte_counts", None, None, None, NONE),
    tag(51023, "fibics_xml", None, Some(Ascii), None, NONE),
    tag(65200, "flex_xml", None, Some(Ascii), None, NONE),
];

/// Look up a tag by id.
pub fn lookup(id: u16) -> Option<&'static TagInfo> {
    TAG_REGISTRY
        .binary_search_by_key(&id, |info| info.id)
        .ok()
        .map(|idx| &TAG_REGISTRY[idx])
}

/// Look up a tag by semantic name.
pub fn lookup_name(name: &str) -> Option<&'static TagInfo> {
    TAG_REGISTRY.iter().find(|info| info.name == name)
}

/// Semantic name of a tag id, if known.
#[inline]
pub fn tag_name(id: u16) -> Option<&'static str> {
    lookup(id).map(|info| info.name)
}
