//! Dummy backend for testing and development.
//!
//! Buffers live in host memory and receive fake, 256-byte aligned device
//! addresses, so binding blobs can be inspected byte for byte without a GPU.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{BindingError, BindingResult};
use crate::types::{BufferDescriptor, DeviceAddress, NativeHandle};

use super::{BackendCapabilities, BindingBackend, TransientBuffer};

const ADDRESS_BASE: DeviceAddress = 0x1_0000_0000;
const ADDRESS_ALIGNMENT: u64 = 256;

/// Host-memory buffer created by [`DummyBackend`].
#[derive(Debug)]
pub struct DummyBuffer {
    handle: NativeHandle,
    device_address: DeviceAddress,
    label: Option<String>,
    data: Vec<u8>,
}

impl DummyBuffer {
    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl TransientBuffer for DummyBuffer {
    fn handle(&self) -> NativeHandle {
        self.handle
    }

    fn device_address(&self) -> DeviceAddress {
        self.device_address
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn contents(&self) -> &[u8] {
        &self.data
    }

    fn contents_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Dummy binding backend.
#[derive(Debug)]
pub struct DummyBackend {
    capabilities: BackendCapabilities,
    allocation_limit: Option<u64>,
    next_handle: AtomicU64,
    next_address: AtomicU64,
    allocations: AtomicU64,
}

impl DummyBackend {
    /// Create a dummy backend supporting every capability.
    pub fn new() -> Self {
        Self {
            capabilities: BackendCapabilities::all(),
            allocation_limit: None,
            next_handle: AtomicU64::new(1),
            next_address: AtomicU64::new(ADDRESS_BASE),
            allocations: AtomicU64::new(0),
        }
    }

    /// Restrict the reported capabilities.
    pub fn with_capabilities(mut self, capabilities: BackendCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Fail every allocation after the first `limit`.
    pub fn with_allocation_limit(mut self, limit: u64) -> Self {
        self.allocation_limit = Some(limit);
        self
    }

    /// Number of buffers created so far.
    pub fn allocation_count(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    fn create_transient_buffer(
        &self,
        descriptor: &BufferDescriptor,
    ) -> BindingResult<Box<dyn TransientBuffer>> {
        if let Some(limit) = self.allocation_limit {
            if self.allocations.load(Ordering::Relaxed) >= limit {
                return Err(BindingError::BufferCreationFailed(format!(
                    "dummy allocation limit of {limit} reached"
                )));
            }
        }

        let size = usize::try_from(descriptor.size).map_err(|_| {
            BindingError::BufferCreationFailed(format!(
                "buffer size {} does not fit in host memory",
                descriptor.size
            ))
        })?;
        let span = descriptor.size.max(1).div_ceil(ADDRESS_ALIGNMENT) * ADDRESS_ALIGNMENT;

        let buffer = DummyBuffer {
            handle: NativeHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)),
            device_address: self.next_address.fetch_add(span, Ordering::Relaxed),
            label: descriptor.label.clone(),
            data: vec![0; size],
        };
        self.allocations.fetch_add(1, Ordering::Relaxed);

        log::trace!(
            "DummyBackend: creating transient buffer {:?} (size: {}, address: {:#x})",
            descriptor.label,
            descriptor.size,
            buffer.device_address
        );
        Ok(Box::new(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_aligned_addresses() {
        let backend = DummyBackend::new();
        let a = backend
            .create_transient_buffer(&BufferDescriptor::constant(16))
            .unwrap();
        let b = backend
            .create_transient_buffer(&BufferDescriptor::constant(300))
            .unwrap();
        let c = backend
            .create_transient_buffer(&BufferDescriptor::constant(8))
            .unwrap();

        assert_ne!(a.handle(), b.handle());
        assert_eq!(a.device_address() % ADDRESS_ALIGNMENT, 0);
        assert_eq!(b.device_address() - a.device_address(), 256);
        assert_eq!(c.device_address() - b.device_address(), 512);
        assert_eq!(b.contents().len(), 300);
        assert!(b.contents().iter().all(|byte| *byte == 0));
        assert_eq!(backend.allocation_count(), 3);
    }

    #[test]
    fn test_allocation_limit() {
        let backend = DummyBackend::new().with_allocation_limit(1);
        assert!(backend
            .create_transient_buffer(&BufferDescriptor::constant(4))
            .is_ok());
        let err = backend
            .create_transient_buffer(&BufferDescriptor::constant(4))
            .unwrap_err();
        assert!(matches!(err, BindingError::BufferCreationFailed(_)));
        assert_eq!(backend.allocation_count(), 1);
    }

    #[test]
    fn test_capabilities() {
        assert!(DummyBackend::new()
            .capabilities()
            .contains(BackendCapabilities::BINDING_BLOBS));
        let flat = DummyBackend::new().with_capabilities(BackendCapabilities::empty());
        assert!(flat.capabilities().is_empty());
        assert_eq!(flat.name(), "Dummy Backend");
    }
}
