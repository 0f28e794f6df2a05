//! Decoded TIFF tag values.
//!
//! A value is always an ordered sequence of scalars of the entry's field
//! type; a sequence of length one is a scalar. Bytes are decoded using the
//! byte order declared in the file header.

use std::fmt;

use super::header::ByteOrder;
use super::tags::FieldType;

/// Decoded value(s) of one IFD entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Byte(Vec<u8>),
    /// Raw ASCII bytes, including any NUL terminators
    Ascii(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<(i32, i32)>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl TagValue {
    /// Decode `count` values of `field_type` from `bytes`.
    ///
    /// `bytes` must hold at least `count * field_type.size_in_bytes()` bytes;
    /// anything past that (e.g. inline slot padding) is ignored.
    pub fn decode(field_type: FieldType, count: usize, bytes: &[u8], order: ByteOrder) -> Self {
        let size = field_type.size_in_bytes();
        let data = &bytes[..count * size];
        let chunks = data.chunks_exact(size);

        match field_type {
            FieldType::Byte => TagValue::Byte(data.to_vec()),
            FieldType::Ascii => TagValue::Ascii(data.to_vec()),
            FieldType::Undefined => TagValue::Undefined(data.to_vec()),
            FieldType::SByte => TagValue::SByte(data.iter().map(|&b| b as i8).collect()),
            FieldType::Short => TagValue::Short(chunks.map(|c| order.read_u16(c)).collect()),
            FieldType::SShort => TagValue::SShort(chunks.map(|c| order.read_i16(c)).collect()),
            FieldType::Long => TagValue::Long(chunks.map(|c| order.read_u32(c)).collect()),
            FieldType::SLong => TagValue::SLong(chunks.map(|c| order.read_i32(c)).collect()),
            FieldType::Rational => TagValue::Rational(
                chunks
                    .map(|c| (order.read_u32(&c[..4]), order.read_u32(&c[4..])))
                    .collect(),
            ),
            FieldType::SRational => TagValue::SRational(
                chunks
                    .map(|c| (order.read_i32(&c[..4]), order.read_i32(&c[4..])))
                    .collect(),
            ),
            FieldType::Float => TagValue::Float(chunks.map(|c| order.read_f32(c)).collect()),
            FieldType::Double => TagValue::Double(chunks.map(|c| order.read_f64(c)).collect()),
        }
    }

    /// Field type this value was decoded as.
    pub fn field_type(&self) -> FieldType {
        match self {
            TagValue::Byte(_) => FieldType::Byte,
            TagValue::Ascii(_) => FieldType::Ascii,
            TagValue::Short(_) => FieldType::Short,
            TagValue::Long(_) => FieldType::Long,
            TagValue::Rational(_) => FieldType::Rational,
            TagValue::SByte(_) => FieldType::SByte,
            TagValue::Undefined(_) => FieldType::Undefined,
            TagValue::SShort(_) => FieldType::SShort,
            TagValue::SLong(_) => FieldType::SLong,
            TagValue::SRational(_) => FieldType::SRational,
            TagValue::Float(_) => FieldType::Float,
            TagValue::Double(_) => FieldType::Double,
        }
    }

    /// Number of scalars.
    pub fn len(&self) -> usize {
        match self {
            TagValue::Byte(v) | TagValue::Ascii(v) | TagValue::Undefined(v) => v.len(),
            TagValue::Short(v) => v.len(),
            TagValue::Long(v) => v.len(),
            TagValue::Rational(v) => v.len(),
            TagValue::SByte(v) => v.len(),
            TagValue::SShort(v) => v.len(),
            TagValue::SLong(v) => v.len(),
            TagValue::SRational(v) => v.len(),
            TagValue::Float(v) => v.len(),
            TagValue::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A single-element value.
    pub fn is_scalar(&self) -> bool {
        self.len() == 1
    }

    /// Element `index` as an unsigned integer.
    ///
    /// Signed values convert only when non-negative; rationals and floats
    /// never convert.
    pub fn get_u64(&self, index: usize) -> Option<u64> {
        match self {
            TagValue::Byte(v) | TagValue::Undefined(v) => v.get(index).map(|&x| x as u64),
            TagValue::Short(v) => v.get(index).map(|&x| x as u64),
            TagValue::Long(v) => v.get(index).map(|&x| x as u64),
            TagValue::SByte(v) => v.get(index).and_then(|&x| u64::try_from(x).ok()),
            TagValue::SShort(v) => v.get(index).and_then(|&x| u64::try_from(x).ok()),
            TagValue::SLong(v) => v.get(index).and_then(|&x| u64::try_from(x).ok()),
            _ => None,
        }
    }

    /// Element `index` as a float, including rationals.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            TagValue::Rational(v) => v.get(index).map(|&(n, d)| n as f64 / d as f64),
            TagValue::SRational(v) => v.get(index).map(|&(n, d)| n as f64 / d as f64),
            TagValue::Float(v) => v.get(index).map(|&x| x as f64),
            TagValue::Double(v) => v.get(index).copied(),
            TagValue::SByte(v) => v.get(index).map(|&x| x as f64),
            TagValue::SShort(v) => v.get(index).map(|&x| x as f64),
            TagValue::SLong(v) => v.get(index).map(|&x| x as f64),
            TagValue::Ascii(_) => None,
            _ => self.get_u64(index).map(|x| x as f64),
        }
    }

    /// The value as an unsigned integer, if it is a scalar.
    pub fn as_u64(&self) -> Option<u64> {
        if self.is_scalar() {
            self.get_u64(0)
        } else {
            None
        }
    }

    /// The value as a `u32`, if it is a scalar that fits.
    pub fn as_u32(&self) -> Option<u32> {
        self.as_u64().and_then(|x| u32::try_from(x).ok())
    }

    /// The value as a float, if it is a scalar.
    pub fn as_f64(&self) -> Option<f64> {
        if self.is_scalar() {
            self.get_f64(0)
        } else {
            None
        }
    }

    /// All elements as unsigned integers.
    ///
    /// Used for offset and byte count arrays; `None` if any element does
    /// not convert.
    pub fn to_u64_vec(&self) -> Option<Vec<u64>> {
        (0..self.len()).map(|i| self.get_u64(i)).collect()
    }

    /// All elements as floats.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        (0..self.len()).map(|i| self.get_f64(i)).collect()
    }

    /// ASCII content as a string, with trailing NULs removed.
    pub fn as_string(&self) -> Option<String> {
        match self {
            TagValue::Ascii(bytes) => {
                let end = bytes
                    .iter()
                    .rposition(|&b| b != 0)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
            _ => None,
        }
    }

    /// Raw bytes of BYTE, ASCII and UNDEFINED values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TagValue::Byte(v) | TagValue::Ascii(v) | TagValue::Undefined(v) => Some(v),
            _ => None,
        }
    }
}

/// Number of elements printed before a value is elided.
const DISPLAY_LIMIT: usize = 8;

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.as_string() {
            return write!(f, "{:?}", s);
        }

        let shown = self.len().min(DISPLAY_LIMIT);
        let items: Vec<String> = (0..shown)
            .map(|i| match self {
                TagValue::Rational(v) => format!("{}/{}", v[i].0, v[i].1),
                TagValue::SRational(v) => format!("{}/{}", v[i].0, v[i].1),
                TagValue::Float(v) => v[i].to_string(),
                TagValue::Double(v) => v[i].to_string(),
                TagValue::SByte(v) => v[i].to_string(),
                TagValue::SShort(v) => v[i].to_string(),
                TagValue::SLong(v) => v[i].to_string(),
                other => other.get_u64(i).map(|x| x.to_string()).unwrap_or_default(),
            })
            .collect();

        if self.is_scalar() {
            write!(f, "{}", items[0])
        } else if self.len() > shown {
            write!(f, "[{}, ... ({} values)]", items.join(", "), self.len())
        } else {
            write!(f, "[{}]", items.join(", "))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
