//! Host device for the CPU runtime

use crate::runtime::Device;

/// The host processor
///
/// Every CPU tensor and random engine lives on this single device; its id is
/// always 0.
#[derive(Clone, Debug, Default)]
pub struct CpuDevice {
    id: usize,
}

impl CpuDevice {
    /// Handle to the host device
    pub fn new() -> Self {
        Self { id: 0 }
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> String {
        "cpu".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_host_device() {
        let a = CpuDevice::new();
        let b = CpuDevice::default();
        assert_eq!(a.id(), 0);
        assert!(a.is_same(&b));
        assert_eq!(a.name(), "cpu");
    }
}
