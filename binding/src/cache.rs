//! Ownership of transient buffers created while encoding.
//!
//! Every ordinary-data buffer and binding blob produced by the
//! [`BindingDataBuilder`](crate::binding::BindingDataBuilder) is handed to a
//! [`BindingCache`]. The cache keeps them alive until [`BindingCache::reset`],
//! which the owner must call only once the recording that references them
//! has been consumed by the GPU or discarded without submission, typically
//! when the command buffer is re-acquired for the next recording.

use crate::backend::TransientBuffer;
use crate::types::NativeHandle;

/// Owns the transient buffers of one command recording.
#[derive(Debug, Default)]
pub struct BindingCache {
    buffers: Vec<Box<dyn TransientBuffer>>,
}

impl BindingCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a buffer until the next reset.
    pub fn own(&mut self, buffer: Box<dyn TransientBuffer>) {
        self.buffers.push(buffer);
    }

    /// Release every owned buffer.
    pub fn reset(&mut self) {
        if !self.buffers.is_empty() {
            log::debug!(
                "BindingCache: releasing {} transient buffers ({} bytes)",
                self.buffers.len(),
                self.total_bytes()
            );
        }
        self.buffers.clear();
    }

    /// Number of owned buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the cache owns nothing.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Owned buffers in creation order.
    pub fn buffers(&self) -> impl Iterator<Item = &dyn TransientBuffer> {
        self.buffers.iter().map(|buffer| buffer.as_ref())
    }

    /// Find an owned buffer by native handle.
    pub fn get(&self, handle: NativeHandle) -> Option<&dyn TransientBuffer> {
        self.buffers().find(|buffer| buffer.handle() == handle)
    }

    /// Total size of all owned buffers in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.buffers.iter().map(|buffer| buffer.size()).sum()
    }
}
