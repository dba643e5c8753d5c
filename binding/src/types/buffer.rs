//! Transient buffer descriptors.

use bitflags::bitflags;

bitflags! {
    /// Usage flags for transient buffers created during binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer holds ordinary (uniform) data bound as a constant buffer.
        const CONSTANT = 1 << 0;
        /// Buffer is a binding blob (argument buffer).
        const BINDING_BLOB = 1 << 1;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 2;
        /// Buffer lives in CPU-visible upload memory.
        const UPLOAD = 1 << 3;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a transient buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a new buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    /// Descriptor for an ordinary-data constant buffer.
    pub fn constant(size: u64) -> Self {
        Self::new(
            size,
            BufferUsage::CONSTANT | BufferUsage::COPY_DST | BufferUsage::UPLOAD,
        )
    }

    /// Descriptor for a binding blob.
    pub fn binding_blob(size: u64) -> Self {
        Self::new(
            size,
            BufferUsage::CONSTANT
                | BufferUsage::BINDING_BLOB
                | BufferUsage::COPY_DST
                | BufferUsage::UPLOAD,
        )
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
