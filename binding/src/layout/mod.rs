//! Binding layouts derived from reflected parameter types.
//!
//! A [`ShaderObjectLayout`] is computed once per distinct parameter type and
//! then shared by every shader object of that type. It records how the
//! type's logical binding ranges map onto object-local slots, how many flat
//! slots of each kind the type needs including everything nested inside it,
//! and how nested sub-objects are positioned relative to their parent.
//!
//! [`RootShaderObjectLayout`] combines the global scope of a program with
//! its entry points, and [`LayoutCache`] shares layouts across threads.

mod builder;
mod cache;
mod root;

use std::ops::{Add, AddAssign, Mul};
use std::sync::{Arc, OnceLock};

use crate::error::BindingResult;
use crate::offset::BindingOffset;
use crate::reflection::{BindingRangeKind, TypeLayout};
use crate::types::ResourceTable;

pub use cache::LayoutCache;
pub use root::{EntryPointLayout, RootShaderObjectLayout};

/// How a shader object is wrapped by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerKind {
    /// Plain value, constant buffer element or entry point parameters.
    #[default]
    Plain,
    /// `ParameterBlock<T>`, bound as a single binding blob.
    ParameterBlock,
}

/// Number of flat slots used per resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceCounts {
    /// Buffer slots.
    pub buffers: u32,
    /// Texture slots.
    pub textures: u32,
    /// Sampler slots.
    pub samplers: u32,
}

impl ResourceCounts {
    /// Total number of slots across all tables.
    pub fn total(&self) -> u32 {
        self.buffers + self.textures + self.samplers
    }

    /// Slot count of one table.
    pub fn get(&self, table: ResourceTable) -> u32 {
        match table {
            ResourceTable::Buffer => self.buffers,
            ResourceTable::Texture => self.textures,
            ResourceTable::Sampler => self.samplers,
        }
    }

    fn add_slots(&mut self, table: ResourceTable, count: u32) {
        match table {
            ResourceTable::Buffer => self.buffers += count,
            ResourceTable::Texture => self.textures += count,
            ResourceTable::Sampler => self.samplers += count,
        }
    }
}

impl Add for ResourceCounts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for ResourceCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.buffers += rhs.buffers;
        self.textures += rhs.textures;
        self.samplers += rhs.samplers;
    }
}

impl Mul<u32> for ResourceCounts {
    type Output = Self;

    fn mul(self, count: u32) -> Self {
        Self {
            buffers: self.buffers * count,
            textures: self.textures * count,
            samplers: self.samplers * count,
        }
    }
}

/// One logical binding range of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingRange {
    /// Range kind.
    pub kind: BindingRangeKind,
    /// Number of array elements.
    pub count: u32,
    /// First object-local resource slot.
    pub slot_index: u32,
    /// Register (flat model) or byte offset (blob model) of the first element.
    ///
    /// `None` when the range has no physical descriptor range.
    pub register_offset: Option<u32>,
    /// First object-local sub-object index, for sub-object kinds and
    /// structured buffers of aggregates.
    pub sub_object_index: Option<u32>,
}

/// A range of nested shader objects.
#[derive(Debug, Clone, PartialEq)]
pub struct SubObjectRange {
    /// Index of the owning binding range.
    pub binding_range_index: usize,
    /// Layout of the nested objects, `None` for unresolved existentials.
    pub layout: Option<Arc<ShaderObjectLayout>>,
    /// Offset of the first element relative to the parent.
    pub offset: BindingOffset,
    /// Offset between consecutive elements.
    pub stride: BindingOffset,
}

impl SubObjectRange {
    /// Offsets of `count` consecutive elements starting at `base + offset`.
    pub fn element_offsets(
        &self,
        base: BindingOffset,
        count: u32,
    ) -> impl Iterator<Item = BindingOffset> {
        let stride = self.stride;
        let mut element_offset = base + self.offset;
        (0..count).map(move |_| {
            let current = element_offset;
            element_offset += stride;
            current
        })
    }
}

/// Binding layout of one shader parameter type.
#[derive(Debug)]
pub struct ShaderObjectLayout {
    element_type_layout: Arc<TypeLayout>,
    container: ContainerKind,
    binding_ranges: Vec<BindingRange>,
    sub_object_ranges: Vec<SubObjectRange>,
    slot_count: u32,
    sub_object_count: u32,
    resource_counts: ResourceCounts,
    total_resource_counts: ResourceCounts,
    total_ordinary_data_size: usize,
    blob_type_layout: OnceLock<Arc<TypeLayout>>,
}

impl ShaderObjectLayout {
    /// Build the layout for objects of `element_type_layout` wrapped in `container`.
    ///
    /// Nested constant buffers, parameter blocks, structured buffers of
    /// aggregates and specialized existentials get their own layouts,
    /// built recursively.
    pub fn create_for_element_type(
        element_type_layout: &Arc<TypeLayout>,
        container: ContainerKind,
    ) -> BindingResult<Arc<Self>> {
        builder::build(element_type_layout, container).map(Arc::new)
    }

    /// Reflected type of the object's ordinary data and slots.
    pub fn element_type_layout(&self) -> &Arc<TypeLayout> {
        &self.element_type_layout
    }

    /// Container kind the layout was built for.
    pub fn container(&self) -> ContainerKind {
        self.container
    }

    /// Logical binding ranges in reflection order.
    pub fn binding_ranges(&self) -> &[BindingRange] {
        &self.binding_ranges
    }

    /// Get a binding range by index.
    pub fn binding_range(&self, index: usize) -> Option<&BindingRange> {
        self.binding_ranges.get(index)
    }

    /// Sub-object ranges in reflection order.
    pub fn sub_object_ranges(&self) -> &[SubObjectRange] {
        &self.sub_object_ranges
    }

    /// Sub-object range owned by the given binding range.
    pub fn sub_object_range_for(&self, binding_range_index: usize) -> Option<&SubObjectRange> {
        self.sub_object_ranges
            .iter()
            .find(|range| range.binding_range_index == binding_range_index)
    }

    /// Number of object-local resource slots.
    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// Number of object-local sub-object slots.
    pub fn sub_object_count(&self) -> u32 {
        self.sub_object_count
    }

    /// Flat slots used by this object alone.
    pub fn resource_counts(&self) -> &ResourceCounts {
        &self.resource_counts
    }

    /// Flat slots used by this object and every nested non-parameter-block object,
    /// counting each array element of a sub-object range.
    pub fn total_resource_counts(&self) -> &ResourceCounts {
        &self.total_resource_counts
    }

    /// Scalar total of [`total_resource_counts`](Self::total_resource_counts).
    pub fn total_resource_count(&self) -> u32 {
        self.total_resource_counts.total()
    }

    /// Bytes of ordinary data bound through this object's own buffer.
    pub fn total_ordinary_data_size(&self) -> usize {
        self.total_ordinary_data_size
    }

    /// Physical type layout used when the object is written into a binding blob.
    ///
    /// Resolved on first use and memoized.
    pub fn blob_type_layout(&self) -> BindingResult<&Arc<TypeLayout>> {
        if let Some(blob) = self.blob_type_layout.get() {
            return Ok(blob);
        }
        let resolved = builder::resolve_blob_layout(&self.element_type_layout)?;
        Ok(self.blob_type_layout.get_or_init(|| resolved))
    }
}

impl PartialEq for ShaderObjectLayout {
    fn eq(&self, other: &Self) -> bool {
        self.element_type_layout == other.element_type_layout
            && self.container == other.container
            && self.binding_ranges == other.binding_ranges
            && self.sub_object_ranges == other.sub_object_ranges
            && self.slot_count == other.slot_count
            && self.sub_object_count == other.sub_object_count
            && self.resource_counts == other.resource_counts
            && self.total_resource_counts == other.total_resource_counts
            && self.total_ordinary_data_size == other.total_ordinary_data_size
    }
}
