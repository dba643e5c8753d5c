//! Shader objects: populated instances of a parameter type.
//!
//! A [`ShaderObject`] stores the ordinary bytes of one instance, one
//! [`ResourceSlot`] per object-local resource slot of its layout, and one
//! optional nested object per sub-object slot. Objects are populated through
//! [`ShaderOffset`]-addressed setters, optionally frozen with
//! [`ShaderObject::finalize`], and then read by the binding builder.

use std::sync::Arc;

use bytemuck::Pod;

use crate::error::{BindingError, BindingResult};
use crate::layout::{BindingRange, RootShaderObjectLayout, ShaderObjectLayout};
use crate::types::{BufferRange, ResourceHandle, ResourceKind};

/// Address of a value inside a shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShaderOffset {
    /// Byte offset into the ordinary data.
    pub uniform_offset: usize,
    /// Binding range index.
    pub binding_range_index: usize,
    /// Array element within the binding range.
    pub binding_array_index: u32,
}

impl ShaderOffset {
    /// Offset of ordinary data.
    pub fn uniform(uniform_offset: usize) -> Self {
        Self {
            uniform_offset,
            ..Default::default()
        }
    }

    /// Offset of an element of a binding range.
    pub fn binding(binding_range_index: usize, binding_array_index: u32) -> Self {
        Self {
            uniform_offset: 0,
            binding_range_index,
            binding_array_index,
        }
    }
}

/// Resource bound into one object-local slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceSlot {
    /// The bound resource.
    pub resource: Option<ResourceHandle>,
    /// Bound byte range, for buffers.
    pub buffer_range: Option<BufferRange>,
}

impl ResourceSlot {
    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.resource.is_none()
    }
}

/// A populated instance of a shader parameter type.
#[derive(Debug, Clone)]
pub struct ShaderObject {
    layout: Arc<ShaderObjectLayout>,
    data: Vec<u8>,
    slots: Vec<ResourceSlot>,
    objects: Vec<Option<Arc<ShaderObject>>>,
    version: u64,
    finalized: bool,
}

impl ShaderObject {
    /// Create a zero-initialized object for a layout.
    pub fn new(layout: &Arc<ShaderObjectLayout>) -> Self {
        Self {
            layout: Arc::clone(layout),
            data: vec![0; layout.element_type_layout().size()],
            slots: vec![ResourceSlot::default(); layout.slot_count() as usize],
            objects: vec![None; layout.sub_object_count() as usize],
            version: 0,
            finalized: false,
        }
    }

    /// Get the layout.
    pub fn layout(&self) -> &Arc<ShaderObjectLayout> {
        &self.layout
    }

    /// Ordinary data in the default (non-blob) physical layout.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Object-local resource slots.
    pub fn slots(&self) -> &[ResourceSlot] {
        &self.slots
    }

    /// Get a resource slot by object-local index.
    pub fn slot(&self, index: usize) -> Option<&ResourceSlot> {
        self.slots.get(index)
    }

    /// Get a nested object by object-local sub-object index.
    pub fn sub_object(&self, index: usize) -> Option<&Arc<ShaderObject>> {
        self.objects.get(index).and_then(Option::as_ref)
    }

    /// Get the nested object at a binding offset.
    pub fn object(&self, offset: ShaderOffset) -> Option<&Arc<ShaderObject>> {
        let range = self.layout.binding_range(offset.binding_range_index)?;
        if offset.binding_array_index >= range.count {
            return None;
        }
        let index = range.sub_object_index? + offset.binding_array_index;
        self.sub_object(index as usize)
    }

    /// Mutation counter, incremented by every successful setter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the object has been frozen.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Freeze the object against further mutation.
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    /// Write ordinary bytes at `offset.uniform_offset`.
    pub fn set_data(&mut self, offset: ShaderOffset, data: &[u8]) -> BindingResult<()> {
        self.check_mutable()?;
        let start = offset.uniform_offset;
        let end = start
            .checked_add(data.len())
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                BindingError::InvalidParameter(format!(
                    "{} bytes at offset {start} exceed the {}-byte ordinary data of `{}`",
                    data.len(),
                    self.data.len(),
                    self.layout.element_type_layout().name()
                ))
            })?;
        self.data[start..end].copy_from_slice(data);
        self.version += 1;
        Ok(())
    }

    /// Write a plain-old-data value at `offset.uniform_offset`.
    pub fn set_value<T: Pod>(&mut self, offset: ShaderOffset, value: &T) -> BindingResult<()> {
        self.set_data(offset, bytemuck::bytes_of(value))
    }

    /// Bind a resource into a texture, sampler or buffer range element.
    pub fn set_binding(
        &mut self,
        offset: ShaderOffset,
        resource: ResourceHandle,
        buffer_range: Option<BufferRange>,
    ) -> BindingResult<()> {
        self.check_mutable()?;
        let (range, index) = self.resource_slot_index(offset)?;
        if !range.kind.accepts(resource.kind()) {
            return Err(BindingError::InvalidParameter(format!(
                "cannot bind a {:?} to {:?} binding range {}",
                resource.kind(),
                range.kind,
                offset.binding_range_index
            )));
        }
        if buffer_range.is_some() && resource.kind() != ResourceKind::Buffer {
            return Err(BindingError::InvalidParameter(format!(
                "buffer range given for a {:?}",
                resource.kind()
            )));
        }
        self.slots[index] = ResourceSlot {
            resource: Some(resource),
            buffer_range,
        };
        self.version += 1;
        Ok(())
    }

    /// Unbind a resource slot.
    pub fn clear_binding(&mut self, offset: ShaderOffset) -> BindingResult<()> {
        self.check_mutable()?;
        let (_, index) = self.resource_slot_index(offset)?;
        self.slots[index] = ResourceSlot::default();
        self.version += 1;
        Ok(())
    }

    /// Attach a nested object to a sub-object range element.
    pub fn set_object(&mut self, offset: ShaderOffset, object: Arc<ShaderObject>) -> BindingResult<()> {
        self.check_mutable()?;
        let range = self.checked_range(offset)?;
        let sub_object_index = range.sub_object_index.ok_or_else(|| {
            BindingError::InvalidParameter(format!(
                "{:?} binding range {} does not hold sub-objects",
                range.kind, offset.binding_range_index
            ))
        })?;

        if let Some(expected) = self
            .layout
            .sub_object_range_for(offset.binding_range_index)
            .and_then(|sub_range| sub_range.layout.as_ref())
        {
            let expected = expected.element_type_layout();
            let actual = object.layout().element_type_layout();
            if !Arc::ptr_eq(expected, actual) && expected.name() != actual.name() {
                return Err(BindingError::LayoutMismatch(format!(
                    "binding range {} expects `{}`, got `{}`",
                    offset.binding_range_index,
                    expected.name(),
                    actual.name()
                )));
            }
        }

        let index = (sub_object_index + offset.binding_array_index) as usize;
        self.objects[index] = Some(object);
        self.version += 1;
        Ok(())
    }

    fn check_mutable(&self) -> BindingResult<()> {
        if self.finalized {
            Err(BindingError::ObjectFinalized)
        } else {
            Ok(())
        }
    }

    fn checked_range(&self, offset: ShaderOffset) -> BindingResult<BindingRange> {
        let range = self
            .layout
            .binding_range(offset.binding_range_index)
            .copied()
            .ok_or_else(|| {
                BindingError::InvalidParameter(format!(
                    "binding range {} out of bounds ({} ranges)",
                    offset.binding_range_index,
                    self.layout.binding_ranges().len()
                ))
            })?;
        if offset.binding_array_index >= range.count {
            return Err(BindingError::InvalidParameter(format!(
                "array index {} out of bounds for binding range {} of {} elements",
                offset.binding_array_index, offset.binding_range_index, range.count
            )));
        }
        Ok(range)
    }

    fn resource_slot_index(&self, offset: ShaderOffset) -> BindingResult<(BindingRange, usize)> {
        let range = self.checked_range(offset)?;
        if range.kind.resource_table().is_none() {
            return Err(BindingError::InvalidParameter(format!(
                "{:?} binding range {} does not hold resources",
                range.kind, offset.binding_range_index
            )));
        }
        Ok((range, (range.slot_index + offset.binding_array_index) as usize))
    }
}

/// Shader objects for a whole program: the global scope plus one object per entry point.
#[derive(Debug, Clone)]
pub struct RootShaderObject {
    layout: Arc<RootShaderObjectLayout>,
    global: ShaderObject,
    entry_points: Vec<ShaderObject>,
}

impl RootShaderObject {
    /// Create zero-initialized objects for a program layout.
    pub fn new(layout: &Arc<RootShaderObjectLayout>) -> Self {
        Self {
            layout: Arc::clone(layout),
            global: ShaderObject::new(layout.global()),
            entry_points: layout
                .entry_points()
                .iter()
                .map(|entry| ShaderObject::new(&entry.layout))
                .collect(),
        }
    }

    /// Get the program layout.
    pub fn layout(&self) -> &Arc<RootShaderObjectLayout> {
        &self.layout
    }

    /// Global-scope object.
    pub fn global(&self) -> &ShaderObject {
        &self.global
    }

    /// Global-scope object for population.
    pub fn global_mut(&mut self) -> &mut ShaderObject {
        &mut self.global
    }

    /// Entry point objects in program order.
    pub fn entry_points(&self) -> &[ShaderObject] {
        &self.entry_points
    }

    /// Entry point object for population.
    pub fn entry_point_mut(&mut self, index: usize) -> Option<&mut ShaderObject> {
        self.entry_points.get_mut(index)
    }

    /// Freeze the global and every entry point object.
    pub fn finalize(&mut self) {
        self.global.finalize();
        for entry_point in &mut self.entry_points {
            entry_point.finalize();
        }
    }
}
