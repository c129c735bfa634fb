//! Image element trait for generic pixel values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in an image pixel.
///
/// Bounds the types usable as pixel values, ensuring they support the
/// numeric conversions the resampling algorithms need (everything is
/// computed in f64 internally).
pub trait ImageElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Whether this type is a floating point type
    fn is_float() -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// Convert an f64 back to this type (saturating casts for integers,
    /// `None` for NaN targets on integer types)
    fn from_f64(value: f64) -> Option<Self> {
        NumCast::from(value)
    }
}

macro_rules! impl_image_element_int {
    ($t:ty) => {
        impl ImageElement for $t {
            fn is_float() -> bool {
                false
            }
        }
    };
}

macro_rules! impl_image_element_float {
    ($t:ty) => {
        impl ImageElement for $t {
            fn is_float() -> bool {
                true
            }
        }
    };
}

impl_image_element_int!(u8);
impl_image_element_int!(u16);
impl_image_element_int!(i16);
impl_image_element_int!(i32);
impl_image_element_float!(f32);
impl_image_element_float!(f64);
