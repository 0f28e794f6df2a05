//! Reversal of the TIFF horizontal differencing predictor.
//!
//! With predictor 2 each sample is stored as the difference from the same
//! sample of the pixel to its left. Decoding is a running sum per row, with
//! wrapping arithmetic in the sample's own integer type.

use crate::error::TiffError;
use crate::format::tiff::Predictor;

use super::decoder::SampleType;

/// Integer sample types the horizontal predictor applies to.
pub trait WrappingSample: Copy {
    fn wrapping_add(self, rhs: Self) -> Self;
}

macro_rules! impl_wrapping_sample {
    ($($t:ty),*) => {
        $(
            impl WrappingSample for $t {
                #[inline(always)]
                fn wrapping_add(self, rhs: Self) -> Self {
                    <$t>::wrapping_add(self, rhs)
                }
            }
        )*
    };
}

impl_wrapping_sample!(u8, u16, i16, u32, i32);

/// Resolve the predictor tag against the sample type of the tile.
///
/// # Errors
/// `UnsupportedPredictor` for unknown predictors, for the floating point
/// predictor (3), and for horizontal differencing on float samples.
pub fn resolve_predictor(raw: u16, sample_type: SampleType) -> Result<Predictor, TiffError> {
    match Predictor::from_u16(raw) {
        Some(Predictor::None) => Ok(Predictor::None),
        Some(Predictor::Horizontal) if !sample_type.is_float() => Ok(Predictor::Horizontal),
        _ => Err(TiffError::UnsupportedPredictor(raw)),
    }
}

/// Undo horizontal differencing in place.
///
/// `samples` holds whole rows of `row_len` samples; the first pixel of each
/// row is stored verbatim.
pub fn rev_hpredict<T: WrappingSample>(samples: &mut [T], row_len: usize, samples_per_pixel: usize) {
    if row_len == 0 {
        return;
    }
    for row in samples.chunks_exact_mut(row_len) {
        for col in samples_per_pixel..row_len {
            row[col] = row[col].wrapping_add(row[col - samples_per_pixel]);
        }
    }
}
