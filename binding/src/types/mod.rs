//! Handles and descriptors shared by the binding modules.

mod buffer;
mod handle;

pub use buffer::{BufferDescriptor, BufferUsage};
pub use handle::{
    BufferBinding, BufferRange, DeviceAddress, NativeHandle, ResourceHandle, ResourceKind,
    ResourceTable,
};
