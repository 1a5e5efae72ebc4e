//! Helper functions for CPU random engine operations
//!
//! Dtype dispatch and the conversion of [`RawBuffer`]s handed to the client
//! back into typed host slices.

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::tensor::RawBuffer;

// ============================================================================
// DType Dispatch Macro
// ============================================================================

/// Macro for dtype dispatch to typed random kernel calls
///
/// This macro matches on a real dtype and executes the code block with the
/// appropriate type. Complex outputs are resolved to their component dtype
/// before reaching a kernel, so complex and `Bool` fall through to a
/// `TypeMismatch` error.
/// Usage: `dispatch_random_dtype!(dtype, T => { code using T }, "op_name")`
macro_rules! dispatch_random_dtype {
    ($dtype:expr, $T:ident => $body:block, $error_op:expr) => {
        match $dtype {
            DType::F64 => {
                type $T = f64;
                $body
            }
            DType::F32 => {
                type $T = f32;
                $body
            }
            DType::I64 => {
                type $T = i64;
                $body
            }
            DType::I32 => {
                type $T = i32;
                $body
            }
            DType::I16 => {
                type $T = i16;
                $body
            }
            DType::I8 => {
                type $T = i8;
                $body
            }
            DType::U64 => {
                type $T = u64;
                $body
            }
            DType::U32 => {
                type $T = u32;
                $body
            }
            DType::U16 => {
                type $T = u16;
                $body
            }
            DType::U8 => {
                type $T = u8;
                $body
            }
            _ => {
                return Err(Error::type_mismatch($error_op, 0, $dtype));
            }
        }
    };
}

/// Same as [`dispatch_random_dtype!`] restricted to floating-point dtypes
macro_rules! dispatch_normal_dtype {
    ($dtype:expr, $T:ident => $body:block, $error_op:expr) => {
        match $dtype {
            DType::F64 => {
                type $T = f64;
                $body
            }
            DType::F32 => {
                type $T = f32;
                $body
            }
            _ => {
                return Err(Error::type_mismatch($error_op, 0, $dtype));
            }
        }
    };
}

pub(crate) use dispatch_normal_dtype;
pub(crate) use dispatch_random_dtype;

/// View a `U32` buffer as a host slice of exactly `len` words
///
/// # Safety
/// - `buf.ptr` must point to live host memory of `buf.len` u32 values for `'a`
/// - nothing may write the buffer while the slice is alive
#[track_caller]
pub(crate) unsafe fn u32_slice<'a>(
    op: &'static str,
    arg_index: usize,
    buf: &RawBuffer,
    len: usize,
) -> Result<&'a [u32]> {
    check_u32_buffer(op, arg_index, buf, len)?;
    Ok(unsafe { std::slice::from_raw_parts(buf.ptr as *const u32, len) })
}

/// Check that a buffer holds exactly `len` non-null `U32` words
#[track_caller]
pub(crate) fn check_u32_buffer(
    op: &'static str,
    arg_index: usize,
    buf: &RawBuffer,
    len: usize,
) -> Result<()> {
    if buf.dtype != DType::U32 {
        return Err(Error::type_mismatch(op, arg_index, buf.dtype));
    }
    if buf.len != len || buf.ptr == 0 {
        return Err(Error::dimension(
            op,
            arg_index,
            format!("{len} words, got {}", buf.len),
        ));
    }
    Ok(())
}
