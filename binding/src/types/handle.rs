//! Opaque native handles for resources referenced by shader objects.

/// A GPU virtual address.
pub type DeviceAddress = u64;

/// Opaque native object handle (a `MTLBuffer*`, `VkImageView`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
    /// Get the raw handle value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Kind of resource a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A buffer.
    Buffer,
    /// A texture view.
    TextureView,
    /// A sampler state.
    Sampler,
}

/// The flat binding tables a resource can be written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceTable {
    /// Buffer slots (constant buffers, raw/typed buffers, blobs).
    Buffer,
    /// Texture slots.
    Texture,
    /// Sampler slots.
    Sampler,
}

impl ResourceKind {
    /// The flat table this kind of resource lands in.
    pub fn table(self) -> ResourceTable {
        match self {
            Self::Buffer => ResourceTable::Buffer,
            Self::TextureView => ResourceTable::Texture,
            Self::Sampler => ResourceTable::Sampler,
        }
    }
}

/// A resource bound into a shader object slot.
///
/// Carries both representations a backend may need: the native object
/// handle written into flat slot tables, and the GPU-visible value
/// (device address for buffers, resource id for textures and samplers)
/// embedded into binding blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    kind: ResourceKind,
    native: NativeHandle,
    gpu_value: u64,
}

impl ResourceHandle {
    /// Create a buffer handle.
    pub fn buffer(native: NativeHandle, device_address: DeviceAddress) -> Self {
        Self {
            kind: ResourceKind::Buffer,
            native,
            gpu_value: device_address,
        }
    }

    /// Create a texture view handle.
    pub fn texture_view(native: NativeHandle, resource_id: u64) -> Self {
        Self {
            kind: ResourceKind::TextureView,
            native,
            gpu_value: resource_id,
        }
    }

    /// Create a sampler handle.
    pub fn sampler(native: NativeHandle, resource_id: u64) -> Self {
        Self {
            kind: ResourceKind::Sampler,
            native,
            gpu_value: resource_id,
        }
    }

    /// Get the resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Get the native object handle.
    pub fn native(&self) -> NativeHandle {
        self.native
    }

    /// Device address (buffers) or GPU resource id (textures, samplers).
    pub fn gpu_value(&self) -> u64 {
        self.gpu_value
    }
}

/// A byte range within a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferRange {
    /// Byte offset from the start of the buffer.
    pub offset: u64,
    /// Size in bytes.
    pub size: u64,
}

impl BufferRange {
    /// Create a new buffer range.
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }
}

/// A buffer written into the flat buffer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferBinding {
    /// Native buffer handle.
    pub handle: NativeHandle,
    /// Byte offset the shader sees as the start of the buffer.
    pub offset: u64,
    /// Bound size in bytes, zero for "rest of the buffer".
    pub size: u64,
}

impl BufferBinding {
    /// Bind a whole buffer.
    pub fn whole(handle: NativeHandle, size: u64) -> Self {
        Self {
            handle,
            offset: 0,
            size,
        }
    }

    /// Bind a sub-range of a buffer.
    pub fn range(handle: NativeHandle, range: BufferRange) -> Self {
        Self {
            handle,
            offset: range.offset,
            size: range.size,
        }
    }
}
