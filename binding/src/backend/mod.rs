//! Device-side seam for transient buffer allocation.
//!
//! The binding engine never creates textures, samplers or long-lived
//! buffers. The only device work it performs is allocating short-lived
//! CPU-visible buffers for ordinary data and binding blobs, which it asks
//! for through [`BindingBackend`].
//!
//! # Available Backends
//!
//! - [`dummy::DummyBackend`]: CPU-backed buffers with fake device addresses,
//!   for tests and tooling.

pub mod dummy;

use bitflags::bitflags;

use crate::error::BindingResult;
use crate::types::{BufferDescriptor, DeviceAddress, NativeHandle, ResourceHandle};

bitflags! {
    /// Optional features a backend may support.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BackendCapabilities: u32 {
        /// Parameter blocks can be bound as binding blobs (argument buffers).
        const BINDING_BLOBS = 1 << 0;
    }
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        Self::empty()
    }
}

/// A CPU-visible buffer created for a single encode operation.
pub trait TransientBuffer: std::fmt::Debug + Send {
    /// Native handle of the buffer.
    fn handle(&self) -> NativeHandle;

    /// GPU virtual address of the first byte.
    fn device_address(&self) -> DeviceAddress;

    /// Size in bytes.
    fn size(&self) -> u64;

    /// Mapped contents.
    fn contents(&self) -> &[u8];

    /// Mapped contents for writing.
    fn contents_mut(&mut self) -> &mut [u8];

    /// Handle usable in slot tables and residency lists.
    fn resource_handle(&self) -> ResourceHandle {
        ResourceHandle::buffer(self.handle(), self.device_address())
    }
}

/// Backend operations the binding engine depends on.
pub trait BindingBackend: Send + Sync {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Optional features supported by the device.
    fn capabilities(&self) -> BackendCapabilities;

    /// Create a zero-initialized transient buffer.
    fn create_transient_buffer(
        &self,
        descriptor: &BufferDescriptor,
    ) -> BindingResult<Box<dyn TransientBuffer>>;
}
