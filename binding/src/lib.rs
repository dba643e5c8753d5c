//! # RedLilium Shader Binding
//!
//! Shader parameter layouts and binding data for RedLilium.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`reflection`] - Read-only view over reflected shader parameter types
//! - [`ShaderObjectLayout`] - Slot layout of a (possibly nested) parameter type
//! - [`ShaderObject`] - Populated instance of a parameter type
//! - [`BindingDataBuilder`] - Flat slot tables and binding blobs for one draw
//! - [`BindingCache`] - Ownership of transient buffers until the recording is retired
//! - [`DummyBackend`] - Host-memory backend for testing
//!
//! ## Example
//!
//! ```ignore
//! use redlilium_shader_binding::{
//!     BindingCache, BindingDataBuilder, DummyBackend, RootShaderObject, RootShaderObjectLayout,
//! };
//!
//! let layout = RootShaderObjectLayout::create(&program)?;
//! let mut root = RootShaderObject::new(&layout);
//! root.global_mut().set_value(ShaderOffset::uniform(0), &tint)?;
//!
//! let backend = DummyBackend::new();
//! let mut cache = BindingCache::new();
//! let data = BindingDataBuilder::new(&backend, &mut cache).bind_as_root(&root)?;
//! // Record the draw with `data`, then once the command buffer is re-acquired:
//! cache.reset();
//! ```

pub mod backend;
pub mod binding;
pub mod cache;
pub mod config;
pub mod error;
pub mod layout;
pub mod object;
pub mod offset;
pub mod profiling;
pub mod reflection;
pub mod types;

// Re-export main types for convenience
pub use backend::dummy::DummyBackend;
pub use backend::{BackendCapabilities, BindingBackend, TransientBuffer};
pub use binding::{BindingBlob, BindingData, BindingDataBuilder};
pub use cache::BindingCache;
pub use config::{BindingConfig, UnresolvedExistentialPolicy};
pub use error::{BindingError, BindingResult};
pub use layout::{
    BindingRange, ContainerKind, EntryPointLayout, LayoutCache, ResourceCounts,
    RootShaderObjectLayout, ShaderObjectLayout, SubObjectRange,
};
pub use object::{ResourceSlot, RootShaderObject, ShaderObject, ShaderOffset};
pub use offset::BindingOffset;
pub use types::{
    BufferBinding, BufferDescriptor, BufferRange, BufferUsage, DeviceAddress, NativeHandle,
    ResourceHandle, ResourceKind, ResourceTable,
};

/// Shader binding library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
