//! CPU runtime implementation

use super::client::CpuClient;
use super::device::CpuDevice;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::alloc::{Layout as AllocLayout, alloc, dealloc};

/// Alignment of every CPU allocation (AVX-512 width)
const CPU_ALIGN: usize = 64;

/// CPU compute runtime
///
/// This is the default runtime that works on any platform.
/// Memory is allocated on the heap using the system allocator.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;

    fn name() -> &'static str {
        "cpu"
    }

    fn allocate(size_bytes: usize, _device: &Self::Device) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        let layout = AllocLayout::from_size_align(size_bytes, CPU_ALIGN)
            .map_err(|_| Error::OutOfMemory { size: size_bytes })?;

        // Output buffers are fully overwritten by kernels, so no zeroing.
        let ptr = unsafe { alloc(layout) };
        if ptr.is_null() {
            return Err(Error::OutOfMemory { size: size_bytes });
        }

        Ok(ptr as u64)
    }

    fn deallocate(ptr: u64, size_bytes: usize, _device: &Self::Device) {
        if ptr == 0 || size_bytes == 0 {
            return;
        }

        // Same layout as `allocate` accepted, so this cannot fail.
        if let Ok(layout) = AllocLayout::from_size_align(size_bytes, CPU_ALIGN) {
            unsafe {
                dealloc(ptr as *mut u8, layout);
            }
        }
    }

    fn copy_to_device(src: &[u8], dst: u64, _device: &Self::Device) -> Result<()> {
        if src.is_empty() || dst == 0 {
            return Ok(());
        }

        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len());
        }
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], _device: &Self::Device) -> Result<()> {
        if dst.is_empty() || src == 0 {
            return Ok(());
        }

        unsafe {
            std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len());
        }
        Ok(())
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }

    fn default_client(device: &Self::Device) -> Self::Client {
        CpuClient::new(device.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_allocation_is_null() {
        let device = CpuDevice::new();
        assert_eq!(CpuRuntime::allocate(0, &device).unwrap(), 0);
        CpuRuntime::deallocate(0, 0, &device);
    }

    #[test]
    fn test_roundtrip_bytes() {
        let device = CpuDevice::new();
        let ptr = CpuRuntime::allocate(4, &device).unwrap();
        CpuRuntime::copy_to_device(&[1, 2, 3, 4], ptr, &device).unwrap();

        let mut out = [0u8; 4];
        CpuRuntime::copy_from_device(ptr, &mut out, &device).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);

        CpuRuntime::deallocate(ptr, 4, &device);
    }

    #[test]
    fn test_oversized_allocation_fails() {
        let device = CpuDevice::new();
        let err = CpuRuntime::allocate(usize::MAX, &device).unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { .. }));
    }
}
