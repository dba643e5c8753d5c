//! Running slot offsets used while walking nested shader objects.

use std::ops::{Add, AddAssign};

use crate::reflection::{CategoryUsage, ParameterCategory, TypeLayout, VariableLayout};

/// Position in every flat slot table at once.
///
/// Offsets are combined component-wise: a nested object is bound at the
/// parent's offset plus the sub-object range offset, and array elements
/// advance by the per-element stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BindingOffset {
    /// Buffer slot.
    pub buffer: u32,
    /// Texture slot.
    pub texture: u32,
    /// Sampler slot.
    pub sampler: u32,
    /// Nested sub-object index.
    pub sub_object: u32,
    /// Bytes of pending existential payload data.
    pub pending_ordinary_data: u32,
}

impl BindingOffset {
    /// Read the absolute offsets of a reflected variable.
    pub fn from_reflection(var_layout: &VariableLayout) -> Self {
        Self::from_usage(var_layout.offsets())
    }

    /// Convert a per-category amount into an offset.
    pub fn from_usage(usage: &CategoryUsage) -> Self {
        Self {
            buffer: usage.get(ParameterCategory::Buffer),
            texture: usage.get(ParameterCategory::Texture),
            sampler: usage.get(ParameterCategory::Sampler),
            sub_object: usage.get(ParameterCategory::SubObject),
            pending_ordinary_data: usage.get(ParameterCategory::PendingData),
        }
    }

    /// Slot usage of one instance of a type, i.e. the stride between array elements.
    pub fn from_type_layout(type_layout: &TypeLayout) -> Self {
        Self::from_usage(type_layout.usage())
    }
}

impl Add for BindingOffset {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for BindingOffset {
    fn add_assign(&mut self, rhs: Self) {
        self.buffer += rhs.buffer;
        self.texture += rhs.texture;
        self.sampler += rhs.sampler;
        self.sub_object += rhs.sub_object;
        self.pending_ordinary_data += rhs.pending_ordinary_data;
    }
}
