//! GeoTIFF key directory.
//!
//! # GeoKeyDirectory layout (tag 34735, SHORT array)
//! ```text
//! [version, revision, minor_revision, number_of_keys]
//! number_of_keys x [key_id, tag_location, count, value_offset]
//! ```
//!
//! `tag_location` says where the value lives: 0 means `value_offset` is the
//! value, 34736 indexes `geo_double_params`, 34737 indexes
//! `geo_ascii_params`, and 34735 indexes the directory array itself.

use crate::error::TiffError;

use super::directory::TagCollection;
use super::tags::TiffTag;
use super::values::TagValue;

// =============================================================================
// Key ids
// =============================================================================

/// GTModelTypeGeoKey
pub const GT_MODEL_TYPE: u16 = 1024;
/// GTRasterTypeGeoKey
pub const GT_RASTER_TYPE: u16 = 1025;
/// GeographicTypeGeoKey
pub const GEOGRAPHIC_TYPE: u16 = 2048;
/// ProjectedCSTypeGeoKey
pub const PROJECTED_CS_TYPE: u16 = 3072;

/// Codes 0 and 32767 mean "undefined" and "user-defined" and carry no EPSG code.
const USER_DEFINED: u16 = 32767;

/// Name of a GeoKey id, for the keys commonly found in GeoTIFFs.
pub fn key_name(id: u16) -> Option<&'static str> {
    let name = match id {
        1024 => "GTModelTypeGeoKey",
        1025 => "GTRasterTypeGeoKey",
        1026 => "GTCitationGeoKey",
        2048 => "GeographicTypeGeoKey",
        2049 => "GeogCitationGeoKey",
        2050 => "GeogGeodeticDatumGeoKey",
        2051 => "GeogPrimeMeridianGeoKey",
        2052 => "GeogLinearUnitsGeoKey",
        2053 => "GeogLinearUnitSizeGeoKey",
        2054 => "GeogAngularUnitsGeoKey",
        2055 => "GeogAngularUnitSizeGeoKey",
        2056 => "GeogEllipsoidGeoKey",
        2057 => "GeogSemiMajorAxisGeoKey",
        2058 => "GeogSemiMinorAxisGeoKey",
        2059 => "GeogInvFlatteningGeoKey",
        2060 => "GeogAzimuthUnitsGeoKey",
        2061 => "GeogPrimeMeridianLongGeoKey",
        3072 => "ProjectedCSTypeGeoKey",
        3073 => "PCSCitationGeoKey",
        3074 => "ProjectionGeoKey",
        3075 => "ProjCoordTransGeoKey",
        3076 => "ProjLinearUnitsGeoKey",
        3077 => "ProjLinearUnitSizeGeoKey",
        3078 => "ProjStdParallel1GeoKey",
        3079 => "ProjStdParallel2GeoKey",
        3080 => "ProjNatOriginLongGeoKey",
        3081 => "ProjNatOriginLatGeoKey",
        3082 => "ProjFalseEastingGeoKey",
        3083 => "ProjFalseNorthingGeoKey",
        3088 => "ProjCenterLongGeoKey",
        3089 => "ProjCenterLatGeoKey",
        3092 => "ProjScaleAtNatOriginGeoKey",
        4096 => "VerticalCSTypeGeoKey",
        4097 => "VerticalCitationGeoKey",
        4098 => "VerticalDatumGeoKey",
        4099 => "VerticalUnitsGeoKey",
        _ => return None,
    };
    Some(name)
}

// =============================================================================
// Types
// =============================================================================

/// Raster space model declared by GTModelTypeGeoKey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    Projected,
    Geographic,
    Geocentric,
    Other(u16),
}

impl ModelType {
    fn from_u16(value: u16) -> Self {
        match value {
            1 => ModelType::Projected,
            2 => ModelType::Geographic,
            3 => ModelType::Geocentric,
            other => ModelType::Other(other),
        }
    }
}

/// Pixel anchoring declared by GTRasterTypeGeoKey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterType {
    /// A pixel covers an area; the tie point is its corner
    PixelIsArea,
    /// A pixel is a point sample; the tie point is its center
    PixelIsPoint,
    Other(u16),
}

impl RasterType {
    fn from_u16(value: u16) -> Self {
        match value {
            1 => RasterType::PixelIsArea,
            2 => RasterType::PixelIsPoint,
            other => RasterType::Other(other),
        }
    }
}

/// Resolved value of one GeoKey.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoKeyValue {
    Short(Vec<u16>),
    Double(Vec<f64>),
    Ascii(String),
}

impl GeoKeyValue {
    /// The value as a single SHORT.
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            GeoKeyValue::Short(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeoKeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoKeyValue::Short(v) if v.len() == 1 => write!(f, "{}", v[0]),
            GeoKeyValue::Short(v) => write!(f, "{:?}", v),
            GeoKeyValue::Double(v) if v.len() == 1 => write!(f, "{}", v[0]),
            GeoKeyValue::Double(v) => write!(f, "{:?}", v),
            GeoKeyValue::Ascii(s) => write!(f, "{:?}", s),
        }
    }
}

/// One entry of the key directory.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoKey {
    pub id: u16,
    /// Tag holding the value (0 for inline)
    pub location: u16,
    pub count: u16,
    pub value: GeoKeyValue,
}

impl GeoKey {
    pub fn name(&self) -> Option<&'static str> {
        key_name(self.id)
    }
}

/// Parsed GeoKeyDirectory with every key resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoKeyDirectory {
    pub version: u16,
    pub revision: u16,
    pub minor_revision: u16,
    /// Keys in file order
    pub keys: Vec<GeoKey>,
}

// =============================================================================
// Parsing
// =============================================================================

fn invalid(message: String) -> TiffError {
    TiffError::InvalidTagValue {
        tag: TiffTag::GeoKeyDirectory.name(),
        message,
    }
}

/// `data[offset..offset + count]`, or an error naming the source tag.
fn slice<'a, T>(
    data: &'a [T],
    offset: u16,
    count: u16,
    key: u16,
    source: &str,
) -> Result<&'a [T], TiffError> {
    let start = offset as usize;
    let end = start + count as usize;
    data.get(start..end).ok_or_else(|| {
        invalid(format!(
            "key {} references {}[{}..{}] but it has {} values",
            key,
            source,
            start,
            end,
            data.len()
        ))
    })
}

impl GeoKeyDirectory {
    /// Parse the key directory of an IFD.
    ///
    /// Returns `Ok(None)` if the IFD has no `geo_key_directory` tag.
    pub fn from_tags(tags: &TagCollection) -> Result<Option<Self>, TiffError> {
        let directory: &[u16] = match tags.value(TiffTag::GeoKeyDirectory) {
            None => return Ok(None),
            Some(TagValue::Short(v)) => v,
            Some(other) => {
                return Err(invalid(format!(
                    "expected SHORT values, got {}",
                    other.field_type().name()
                )))
            }
        };

        if directory.len() < 4 {
            return Err(invalid(format!(
                "header needs 4 values, got {}",
                directory.len()
            )));
        }

        let number_of_keys = directory[3] as usize;
        let needed = 4 + 4 * number_of_keys;
        if directory.len() < needed {
            return Err(invalid(format!(
                "{} keys need {} values, got {}",
                number_of_keys,
                needed,
                directory.len()
            )));
        }

        let doubles = tags
            .value(TiffTag::GeoDoubleParams)
            .and_then(TagValue::to_f64_vec)
            .unwrap_or_default();
        let ascii = tags
            .value(TiffTag::GeoAsciiParams)
            .and_then(TagValue::as_bytes)
            .unwrap_or_default();

        let mut keys = Vec::with_capacity(number_of_keys);
        for record in directory[4..needed].chunks_exact(4) {
            let (id, location, count, value_offset) = (record[0], record[1], record[2], record[3]);

            let value = match location {
                0 => GeoKeyValue::Short(vec![value_offset]),
                34735 => GeoKeyValue::Short(
                    slice(directory, value_offset, count, id, "geo_key_directory")?.to_vec(),
                ),
                34736 => GeoKeyValue::Double(
                    slice(&doubles, value_offset, count, id, "geo_double_params")?.to_vec(),
                ),
                34737 => {
                    let raw = slice(ascii, value_offset, count, id, "geo_ascii_params")?;
                    let text = String::from_utf8_lossy(raw);
                    let text = text.trim_end_matches('\0');
                    GeoKeyValue::Ascii(text.strip_suffix('|').unwrap_or(text).to_string())
                }
                other => {
                    return Err(invalid(format!(
                        "key {} has unknown value location {}",
                        id, other
                    )))
                }
            };

            keys.push(GeoKey {
                id,
                location,
                count,
                value,
            });
        }

        Ok(Some(GeoKeyDirectory {
            version: directory[0],
            revision: directory[1],
            minor_revision: directory[2],
            keys,
        }))
    }

    /// Look up a key by id.
    pub fn get(&self, id: u16) -> Option<&GeoKey> {
        self.keys.iter().find(|key| key.id == id)
    }

    fn short(&self, id: u16) -> Option<u16> {
        self.get(id).and_then(|key| key.value.as_u16())
    }

    pub fn model_type(&self) -> Option<ModelType> {
        self.short(GT_MODEL_TYPE).map(ModelType::from_u16)
    }

    pub fn raster_type(&self) -> Option<RasterType> {
        self.short(GT_RASTER_TYPE).map(RasterType::from_u16)
    }

    /// EPSG code of the CRS: the projected CRS if set, else the geographic one.
    pub fn epsg(&self) -> Option<u16> {
        let valid = |code: u16| code != 0 && code != USER_DEFINED;
        self.short(PROJECTED_CS_TYPE)
            .filter(|&c| valid(c))
            .or_else(|| self.short(GEOGRAPHIC_TYPE).filter(|&c| valid(c)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
