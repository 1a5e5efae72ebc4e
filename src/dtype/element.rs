//! Element trait for mapping Rust types to DType

use super::DType;
use super::complex::{Complex64, Complex128};
use bytemuck::{Pod, Zeroable};

/// Trait for types that can be elements of a tensor
///
/// This trait connects Rust's type system to the runtime dtype system.
/// It's implemented for all primitive numeric types and both complex types.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - Basic trait requirements
/// - `Pod + Zeroable` - Safe memory transmutation (bytemuck)
pub trait Element: Copy + Send + Sync + Pod + Zeroable + PartialEq + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Zero value
    fn zero() -> Self {
        Self::zeroed()
    }
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;
            }
        )*
    };
}

impl_element!(
    f64 => F64,
    f32 => F32,
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    u64 => U64,
    u32 => U32,
    u16 => U16,
    u8 => U8,
    Complex64 => Complex64,
    Complex128 => Complex128,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_matches_size() {
        fn check<T: Element>() {
            assert_eq!(std::mem::size_of::<T>(), T::DTYPE.size_in_bytes());
        }
        check::<f64>();
        check::<f32>();
        check::<i16>();
        check::<u8>();
        check::<Complex64>();
        check::<Complex128>();
    }

    #[test]
    fn test_zero() {
        assert_eq!(<u32 as Element>::zero(), 0);
        assert_eq!(<Complex64 as Element>::zero(), Complex64::ZERO);
    }
}
