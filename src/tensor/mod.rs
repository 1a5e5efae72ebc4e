//! Tensor types
//!
//! This module provides the `Tensor` type, an n-dimensional array stored on a
//! compute device. Random generation allocates tensors through it and hands
//! them to the kernel backend as [`RawBuffer`]s.

mod core;
mod layout;
mod storage;

pub use self::core::Tensor;
pub use layout::Layout;
pub use storage::{RawBuffer, Storage};
