use thiserror::Error;

/// I/O errors that can occur when reading byte ranges from storage
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error from S3 or S3-compatible storage
    #[error("S3 error: {0}")]
    S3(String),

    /// Error from the local filesystem
    #[error("File error: {0}")]
    File(String),

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Inclusive range with start after end
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: u64, end: u64 },

    /// Transport returned fewer (or more) bytes than requested
    #[error("Short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Object not found
    #[error("Object not found: {0}")]
    NotFound(String),
}

impl IoError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            IoError::S3(_) | IoError::Connection(_) | IoError::ShortRead { .. }
        )
    }
}

/// Coarse classification of a [`TiffError`].
///
/// Callers branch on this instead of matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes do not form a valid TIFF structure
    Format,
    /// Valid TIFF, but uses a feature this decoder does not implement
    Unsupported,
    /// Fetching a byte range failed
    Io,
    /// Tile data could not be turned into samples
    Decode,
    /// Tile index outside the tile arrays
    OutOfRange,
}

/// Errors that can occur when parsing TIFF files and decoding tiles
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Byte order marker is neither II nor MM
    #[error("Invalid TIFF byte order: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidByteOrder(u16),

    /// Magic number is not 42
    #[error("Not a valid TIFF: expected version 42, got {0}")]
    InvalidVersion(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or into the header)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Directory declares zero entries
    #[error("IFD at offset {0} has no entries")]
    EmptyDirectory(u64),

    /// Unknown field type in IFD entry
    #[error("Unknown field type {field_type} in entry for tag {tag_id}")]
    UnknownFieldType { tag_id: u16, field_type: u16 },

    /// Required tag is missing from IFD
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// A dimension used as a divisor is zero
    #[error("Zero dimension: {0} must be greater than 0")]
    ZeroDimension(&'static str),

    /// BigTIFF (version 43) files use 64-bit offsets
    #[error("Unsupported format: BigTIFF is not supported")]
    BigTiff,

    /// Compression scheme other than Deflate
    #[error("Unsupported compression: {0} (only Deflate is supported)")]
    UnsupportedCompression(u16),

    /// Bits per sample / sample format combination has no decoder
    #[error("Unsupported sample encoding: {bits_per_sample} bits, sample format {sample_format}")]
    UnsupportedSampleFormat {
        bits_per_sample: u16,
        sample_format: u16,
    },

    /// Predictor that cannot be reversed for this sample encoding
    #[error("Unsupported predictor: {0}")]
    UnsupportedPredictor(u16),

    /// Planar (separate) sample organization
    #[error("Unsupported organization: planar configuration {0}")]
    UnsupportedPlanarConfiguration(u16),

    /// Inflate failed
    #[error("Decompression failed for tile {index}: {message}")]
    Decompression { index: usize, message: String },

    /// Decompressed size does not match tile geometry
    #[error("Tile {index} size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Tile has a byte count of zero
    #[error("Tile {0} has no data")]
    EmptyTile(usize),

    /// Tile index beyond the tile offset/byte count arrays
    #[error("Tile index {index} out of range (image has {count} tiles)")]
    TileOutOfRange { index: usize, count: usize },
}

impl TiffError {
    /// Classify this error into one of the five error kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TiffError::Io(_) => ErrorKind::Io,
            TiffError::InvalidByteOrder(_)
            | TiffError::InvalidVersion(_)
            | TiffError::FileTooSmall { .. }
            | TiffError::InvalidIfdOffset(_)
            | TiffError::EmptyDirectory(_)
            | TiffError::UnknownFieldType { .. }
            | TiffError::MissingTag(_)
            | TiffError::InvalidTagValue { .. }
            | TiffError::ZeroDimension(_) => ErrorKind::Format,
            TiffError::BigTiff
            | TiffError::UnsupportedCompression(_)
            | TiffError::UnsupportedSampleFormat { .. }
            | TiffError::UnsupportedPredictor(_)
            | TiffError::UnsupportedPlanarConfiguration(_) => ErrorKind::Unsupported,
            TiffError::Decompression { .. }
            | TiffError::SizeMismatch { .. }
            | TiffError::EmptyTile(_) => ErrorKind::Decode,
            TiffError::TileOutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }
}
