//! Binding data construction.
//!
//! [`BindingDataBuilder`] walks a populated [`RootShaderObject`] and produces
//! the [`BindingData`] consumed when recording a draw or dispatch:
//!
//! - Flat-slot model: native handles written into per-kind tables at
//!   `register offset + parent offset + array index`.
//! - Binding-blob model: parameter blocks are serialized into a transient
//!   buffer of 8-byte addresses and resource ids (see
//!   [`BindingDataBuilder::write_binding_blob`]), which is then bound through
//!   a single buffer slot.
//!
//! Every transient buffer created along the way is handed to the
//! [`BindingCache`], including when binding fails part-way through.

mod blob;

use crate::backend::{BackendCapabilities, BindingBackend, TransientBuffer};
use crate::cache::BindingCache;
use crate::config::{BindingConfig, UnresolvedExistentialPolicy};
use crate::error::{BindingError, BindingResult};
use crate::layout::{BindingRange, ResourceCounts, SubObjectRange};
use crate::object::{ResourceSlot, RootShaderObject, ShaderObject};
use crate::offset::BindingOffset;
use crate::reflection::BindingRangeKind;
use crate::types::{
    BufferBinding, BufferDescriptor, DeviceAddress, NativeHandle, ResourceHandle, ResourceTable,
};
use crate::{profile_plot, profile_scope};

/// A binding blob written by [`BindingDataBuilder::write_binding_blob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingBlob {
    /// Native handle of the blob buffer.
    pub handle: NativeHandle,
    /// Device address of the first byte.
    pub device_address: DeviceAddress,
    /// Size in bytes.
    pub size: u64,
}

impl BindingBlob {
    fn from_buffer(buffer: &dyn TransientBuffer) -> Self {
        Self {
            handle: buffer.handle(),
            device_address: buffer.device_address(),
            size: buffer.size(),
        }
    }

    /// Handle usable in slot tables and residency lists.
    pub fn resource_handle(&self) -> ResourceHandle {
        ResourceHandle::buffer(self.handle, self.device_address)
    }
}

/// Flat binding tables and residency lists for one draw or dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingData {
    buffers: Vec<Option<BufferBinding>>,
    textures: Vec<Option<NativeHandle>>,
    samplers: Vec<Option<NativeHandle>>,
    used_resources: Vec<ResourceHandle>,
    used_rw_resources: Vec<ResourceHandle>,
}

impl BindingData {
    /// Create empty tables sized exactly to `counts`.
    pub fn with_capacity(counts: &ResourceCounts) -> Self {
        Self {
            buffers: vec![None; counts.buffers as usize],
            textures: vec![None; counts.textures as usize],
            samplers: vec![None; counts.samplers as usize],
            used_resources: Vec::new(),
            used_rw_resources: Vec::new(),
        }
    }

    /// Buffer table.
    pub fn buffers(&self) -> &[Option<BufferBinding>] {
        &self.buffers
    }

    /// Texture table.
    pub fn textures(&self) -> &[Option<NativeHandle>] {
        &self.textures
    }

    /// Sampler table.
    pub fn samplers(&self) -> &[Option<NativeHandle>] {
        &self.samplers
    }

    /// Read-only resources referenced only through binding blobs.
    pub fn used_resources(&self) -> &[ResourceHandle] {
        &self.used_resources
    }

    /// Writable resources referenced only through binding blobs.
    pub fn used_rw_resources(&self) -> &[ResourceHandle] {
        &self.used_rw_resources
    }

    /// Number of populated entries in a table.
    pub fn bound_count(&self, table: ResourceTable) -> usize {
        match table {
            ResourceTable::Buffer => self.buffers.iter().flatten().count(),
            ResourceTable::Texture => self.textures.iter().flatten().count(),
            ResourceTable::Sampler => self.samplers.iter().flatten().count(),
        }
    }

    /// Write a buffer slot.
    pub fn set_buffer(&mut self, index: u32, binding: BufferBinding) -> BindingResult<()> {
        write_slot(&mut self.buffers, ResourceTable::Buffer, index, binding)
    }

    /// Write a texture slot.
    pub fn set_texture(&mut self, index: u32, texture: NativeHandle) -> BindingResult<()> {
        write_slot(&mut self.textures, ResourceTable::Texture, index, texture)
    }

    /// Write a sampler slot.
    pub fn set_sampler(&mut self, index: u32, sampler: NativeHandle) -> BindingResult<()> {
        write_slot(&mut self.samplers, ResourceTable::Sampler, index, sampler)
    }
}

fn write_slot<T>(
    table: &mut [Option<T>],
    which: ResourceTable,
    index: u32,
    value: T,
) -> BindingResult<()> {
    let capacity = table.len() as u32;
    let slot = table
        .get_mut(index as usize)
        .ok_or(BindingError::CapacityExceeded {
            table: which,
            index,
            capacity,
        })?;
    *slot = Some(value);
    Ok(())
}

/// Builds [`BindingData`] for one encode operation.
///
/// Borrows the encode operation's [`BindingCache`] mutably, so at most one
/// builder can feed a cache at a time.
pub struct BindingDataBuilder<'a> {
    backend: &'a dyn BindingBackend,
    cache: &'a mut BindingCache,
    config: BindingConfig,
}

impl<'a> BindingDataBuilder<'a> {
    /// Create a builder with the default configuration.
    pub fn new(backend: &'a dyn BindingBackend, cache: &'a mut BindingCache) -> Self {
        Self {
            backend,
            cache,
            config: BindingConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Bind a whole program.
    pub fn bind_as_root(&mut self, root: &RootShaderObject) -> BindingResult<BindingData> {
        profile_scope!("bind_as_root");

        let layout = root.layout();
        if root.entry_points().len() != layout.entry_points().len() {
            return Err(BindingError::LayoutMismatch(format!(
                "root object has {} entry points, layout has {}",
                root.entry_points().len(),
                layout.entry_points().len()
            )));
        }

        let mut data = BindingData::with_capacity(layout.total_resource_counts());
        let root_offset = BindingOffset::default();

        // Global ranges carry absolute registers, so the global ordinary-data
        // buffer must not shift the offset they are bound at.
        let global = root.global();
        self.bind_ordinary_data(&mut data, global, root_offset)?;
        self.bind_as_value(&mut data, global, root_offset)?;

        for (entry_layout, entry_object) in layout.entry_points().iter().zip(root.entry_points()) {
            self.bind_as_constant_buffer(&mut data, entry_object, root_offset + entry_layout.offset)?;
        }

        profile_plot!("binding_cache_bytes", self.cache.total_bytes());
        Ok(data)
    }

    /// Bind an object whose ordinary data lives in its own constant buffer.
    pub fn bind_as_constant_buffer(
        &mut self,
        data: &mut BindingData,
        object: &ShaderObject,
        offset: BindingOffset,
    ) -> BindingResult<()> {
        self.bind_ordinary_data(data, object, offset)?;
        // Register offsets of the object's ranges already account for the
        // ordinary-data slot.
        self.bind_as_value(data, object, offset)
    }

    /// Bind an object's resources and nested objects at `offset`.
    pub fn bind_as_value(
        &mut self,
        data: &mut BindingData,
        object: &ShaderObject,
        offset: BindingOffset,
    ) -> BindingResult<()> {
        let layout = object.layout();

        for (binding_range_index, range) in layout.binding_ranges().iter().enumerate() {
            if let Some(table) = range.kind.resource_table() {
                bind_resource_range(data, object, binding_range_index, range, table, offset)?;
            }
        }

        for sub_range in layout.sub_object_ranges() {
            let range = owning_range(object, sub_range)?;
            let Some(first) = range.sub_object_index else {
                continue;
            };

            let element_offsets = sub_range.element_offsets(offset, range.count);
            for (array_index, element_offset) in (0u32..).zip(element_offsets) {
                let index = first + array_index;
                match range.kind {
                    BindingRangeKind::ConstantBuffer => {
                        let nested = required_sub_object(object, sub_range, array_index, index)?;
                        self.bind_as_constant_buffer(data, nested, element_offset)?;
                    }
                    BindingRangeKind::ParameterBlock => {
                        let nested = required_sub_object(object, sub_range, array_index, index)?;
                        self.bind_as_parameter_block(data, nested, element_offset)?;
                    }
                    BindingRangeKind::ExistentialValue => {
                        self.bind_existential(data, object, sub_range, array_index, index)?;
                    }
                    // Structured buffer elements are only reachable through the buffer itself.
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Bind an object as a parameter block: one buffer slot holding its binding blob.
    pub fn bind_as_parameter_block(
        &mut self,
        data: &mut BindingData,
        object: &ShaderObject,
        offset: BindingOffset,
    ) -> BindingResult<()> {
        if !self
            .backend
            .capabilities()
            .contains(BackendCapabilities::BINDING_BLOBS)
        {
            return Err(BindingError::CapabilityUnavailable(format!(
                "parameter block `{}` needs binding blob support, which {} lacks",
                object.layout().element_type_layout().name(),
                self.backend.name()
            )));
        }

        if let Some(blob) = self.write_binding_blob(data, object)? {
            data.set_buffer(offset.buffer, BufferBinding::whole(blob.handle, blob.size))?;
        }
        Ok(())
    }

    /// Bind one existential element at a fresh zero offset.
    ///
    /// Every element of an existential array lands on the same slots, so
    /// `ExistentialValue m[N]` does not stride: later elements overwrite
    /// earlier ones.
    fn bind_existential(
        &mut self,
        data: &mut BindingData,
        object: &ShaderObject,
        sub_range: &SubObjectRange,
        array_index: u32,
        index: u32,
    ) -> BindingResult<()> {
        if sub_range.layout.is_none() {
            return self.unresolved_existential(object, sub_range, array_index);
        }

        let nested = required_sub_object(object, sub_range, array_index, index)?;
        self.bind_as_value(data, nested, BindingOffset::default())
    }

    /// Apply the unresolved existential policy to one element.
    fn unresolved_existential(
        &self,
        object: &ShaderObject,
        sub_range: &SubObjectRange,
        array_index: u32,
    ) -> BindingResult<()> {
        match self.config.unresolved_existential {
            UnresolvedExistentialPolicy::Fail => Err(BindingError::UnresolvedExistentialBinding {
                binding_range_index: sub_range.binding_range_index,
            }),
            UnresolvedExistentialPolicy::Skip => {
                log::warn!(
                    "BindingDataBuilder: skipping unresolved existential {}[{}] of `{}`",
                    sub_range.binding_range_index,
                    array_index,
                    object.layout().element_type_layout().name()
                );
                Ok(())
            }
        }
    }

    fn bind_ordinary_data(
        &mut self,
        data: &mut BindingData,
        object: &ShaderObject,
        offset: BindingOffset,
    ) -> BindingResult<()> {
        let layout = object.layout();
        let size = layout.total_ordinary_data_size();
        if size == 0 {
            return Ok(());
        }

        let type_name = layout.element_type_layout().name();
        let bytes = object.data().get(..size).ok_or_else(|| {
            BindingError::LayoutMismatch(format!(
                "`{type_name}` holds {} ordinary bytes, layout needs {size}",
                object.data().len()
            ))
        })?;

        let descriptor = BufferDescriptor::constant(size as u64)
            .with_label(self.config.label("cb", type_name));
        let mut buffer = self.backend.create_transient_buffer(&descriptor)?;
        let copied = match buffer.contents_mut().get_mut(..size) {
            Some(contents) => {
                contents.copy_from_slice(bytes);
                true
            }
            None => false,
        };
        let binding = BufferBinding::whole(buffer.handle(), size as u64);
        self.cache.own(buffer);

        if !copied {
            return Err(BindingError::BufferCreationFailed(format!(
                "transient buffer for `{type_name}` is smaller than {size} bytes"
            )));
        }
        data.set_buffer(offset.buffer, binding)
    }
}

fn bind_resource_range(
    data: &mut BindingData,
    object: &ShaderObject,
    binding_range_index: usize,
    range: &BindingRange,
    table: ResourceTable,
    offset: BindingOffset,
) -> BindingResult<()> {
    for i in 0..range.count {
        let slot = resource_slot(object, range, i)?;
        let Some(resource) = slot.resource else {
            continue;
        };
        let register = range
            .register_offset
            .ok_or(BindingError::MissingRegisterOffset { binding_range_index })?;

        match table {
            ResourceTable::Buffer => {
                let binding = match slot.buffer_range {
                    Some(buffer_range) => BufferBinding::range(resource.native(), buffer_range),
                    None => BufferBinding::whole(resource.native(), 0),
                };
                data.set_buffer(register + offset.buffer + i, binding)?;
            }
            ResourceTable::Texture => {
                data.set_texture(register + offset.texture + i, resource.native())?;
            }
            ResourceTable::Sampler => {
                data.set_sampler(register + offset.sampler + i, resource.native())?;
            }
        }
    }
    Ok(())
}

fn resource_slot<'o>(
    object: &'o ShaderObject,
    range: &BindingRange,
    array_index: u32,
) -> BindingResult<&'o ResourceSlot> {
    let index = range.slot_index + array_index;
    object.slot(index as usize).ok_or_else(|| {
        BindingError::LayoutMismatch(format!(
            "`{}` has no resource slot {index}",
            object.layout().element_type_layout().name()
        ))
    })
}

fn owning_range<'o>(
    object: &'o ShaderObject,
    sub_range: &SubObjectRange,
) -> BindingResult<&'o BindingRange> {
    object
        .layout()
        .binding_range(sub_range.binding_range_index)
        .ok_or_else(|| {
            BindingError::InvalidReflection(format!(
                "sub-object range refers to missing binding range {}",
                sub_range.binding_range_index
            ))
        })
}

fn required_sub_object<'o>(
    object: &'o ShaderObject,
    sub_range: &SubObjectRange,
    array_index: u32,
    index: u32,
) -> BindingResult<&'o ShaderObject> {
    object
        .sub_object(index as usize)
        .map(|nested| nested.as_ref())
        .ok_or(BindingError::MissingSubObject {
            binding_range_index: sub_range.binding_range_index,
            array_index,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::dummy::DummyBackend;

    #[test]
    fn test_tables_are_sized_exactly() {
        let counts = ResourceCounts {
            buffers: 2,
            textures: 1,
            samplers: 0,
        };
        let mut data = BindingData::with_capacity(&counts);
        assert_eq!(data.buffers().len(), 2);
        assert_eq!(data.textures().len(), 1);
        assert!(data.samplers().is_empty());

        data.set_texture(0, NativeHandle(9)).unwrap();
        assert_eq!(data.bound_count(ResourceTable::Texture), 1);

        let err = data.set_sampler(0, NativeHandle(1)).unwrap_err();
        assert_eq!(
            err,
            BindingError::CapacityExceeded {
                table: ResourceTable::Sampler,
                index: 0,
                capacity: 0,
            }
        );
        assert!(data
            .set_buffer(2, BufferBinding::whole(NativeHandle(3), 16))
            .is_err());
    }

    #[test]
    fn test_builder_config() {
        let backend = DummyBackend::new();
        let mut cache = BindingCache::new();
        let builder = BindingDataBuilder::new(&backend, &mut cache).with_config(
            BindingConfig::new().with_unresolved_existential(UnresolvedExistentialPolicy::Skip),
        );
        assert_eq!(
            builder.config().unresolved_existential,
            UnresolvedExistentialPolicy::Skip
        );
    }
}
