//! Read-only view over reflected shader parameter types.
//!
//! The binding engine never talks to a shader compiler directly. An
//! external reflection adapter (Slang, naga, hand-written tables) describes
//! every parameter type as a [`TypeLayout`]: its ordinary-data size, the
//! slot usage per [`ParameterCategory`], the ordered list of logical
//! binding ranges and the sub-object ranges nested inside it. Types that may
//! be bound as parameter blocks can additionally carry the alternate
//! physical layout used by the binding-blob model.
//!
//! Descriptions are built with [`TypeLayout::builder`] and shared through
//! `Arc`, so the same reflected type can back any number of layouts.
//!
//! # Example
//!
//! ```ignore
//! let light = TypeLayout::builder("Light")
//!     .uniform_size(12)
//!     .build();
//! let light_cb = TypeLayout::builder("ConstantBuffer<Light>")
//!     .slots(ParameterCategory::Buffer, 1)
//!     .element_type(light)
//!     .build();
//! ```

mod builder;

use std::sync::Arc;

use crate::types::{ResourceKind, ResourceTable};

pub use builder::TypeLayoutBuilder;

/// Resource categories a type can consume space in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterCategory {
    /// Ordinary (uniform) bytes.
    Uniform,
    /// Buffer slots.
    Buffer,
    /// Texture slots.
    Texture,
    /// Sampler slots.
    Sampler,
    /// Nested sub-object slots.
    SubObject,
    /// Ordinary bytes reserved for specialized existential payloads.
    PendingData,
}

impl ParameterCategory {
    /// Number of categories.
    pub const COUNT: usize = 6;

    /// All categories in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Uniform,
        Self::Buffer,
        Self::Texture,
        Self::Sampler,
        Self::SubObject,
        Self::PendingData,
    ];

    fn index(self) -> usize {
        match self {
            Self::Uniform => 0,
            Self::Buffer => 1,
            Self::Texture => 2,
            Self::Sampler => 3,
            Self::SubObject => 4,
            Self::PendingData => 5,
        }
    }
}

/// Amount of space used (or offset reached) in every [`ParameterCategory`].
///
/// Used both for type sizes and for variable offsets, mirroring how
/// reflection APIs report `size(category)` and `offset(category)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CategoryUsage {
    amounts: [u32; ParameterCategory::COUNT],
}

impl CategoryUsage {
    /// Create an empty usage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the amount for a category.
    pub fn with(mut self, category: ParameterCategory, amount: u32) -> Self {
        self.set(category, amount);
        self
    }

    /// Set the amount for a category in place.
    pub fn set(&mut self, category: ParameterCategory, amount: u32) {
        self.amounts[category.index()] = amount;
    }

    /// Get the amount for a category.
    pub fn get(&self, category: ParameterCategory) -> u32 {
        self.amounts[category.index()]
    }

    /// Iterate the categories with a non-zero amount.
    pub fn categories(&self) -> impl Iterator<Item = ParameterCategory> + '_ {
        ParameterCategory::ALL
            .into_iter()
            .filter(|category| self.get(*category) != 0)
    }
}

/// Kind of a logical binding range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingRangeKind {
    /// `ConstantBuffer<T>` or `cbuffer`.
    ConstantBuffer,
    /// `ParameterBlock<T>`.
    ParameterBlock,
    /// Interface-typed value.
    ExistentialValue,
    /// Read-only texture.
    Texture,
    /// Read-write texture.
    MutableTexture,
    /// Sampler state.
    Sampler,
    /// Read-only byte-address or structured buffer.
    RawBuffer,
    /// Read-write byte-address or structured buffer.
    MutableRawBuffer,
    /// Read-only typed (formatted) buffer.
    TypedBuffer,
    /// Read-write typed (formatted) buffer.
    MutableTypedBuffer,
    /// Stage input.
    VaryingInput,
    /// Stage output.
    VaryingOutput,
}

impl BindingRangeKind {
    /// Whether elements of this range are nested shader objects.
    pub fn is_sub_object(self) -> bool {
        matches!(
            self,
            Self::ConstantBuffer | Self::ParameterBlock | Self::ExistentialValue
        )
    }

    /// Whether the shader may write through this range.
    pub fn is_mutable(self) -> bool {
        matches!(
            self,
            Self::MutableTexture | Self::MutableRawBuffer | Self::MutableTypedBuffer
        )
    }

    /// Whether this is a raw (byte-address or structured) buffer range.
    pub fn is_raw_buffer(self) -> bool {
        matches!(self, Self::RawBuffer | Self::MutableRawBuffer)
    }

    /// The flat table resources of this range are written into.
    pub fn resource_table(self) -> Option<ResourceTable> {
        match self {
            Self::Texture | Self::MutableTexture => Some(ResourceTable::Texture),
            Self::Sampler => Some(ResourceTable::Sampler),
            Self::RawBuffer
            | Self::MutableRawBuffer
            | Self::TypedBuffer
            | Self::MutableTypedBuffer => Some(ResourceTable::Buffer),
            Self::ConstantBuffer
            | Self::ParameterBlock
            | Self::ExistentialValue
            | Self::VaryingInput
            | Self::VaryingOutput => None,
        }
    }

    /// Whether a resource of the given kind can be bound to this range.
    pub fn accepts(self, kind: ResourceKind) -> bool {
        self.resource_table() == Some(kind.table())
    }
}

/// A physical descriptor or argument range backing a binding range.
///
/// Under the flat-slot model `offset` is a register index; under the
/// binding-blob model it is a byte offset into the blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    /// Register index or byte offset.
    pub offset: u32,
    /// Number of descriptors in the range.
    pub count: u32,
}

/// One reflected logical binding range.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingRangeReflection {
    kind: BindingRangeKind,
    count: u32,
    leaf_type_layout: Arc<TypeLayout>,
    descriptor_ranges: Vec<DescriptorRange>,
    specialization: Option<Arc<TypeLayout>>,
}

impl BindingRangeReflection {
    /// Create a binding range without physical descriptor ranges.
    pub fn new(kind: BindingRangeKind, count: u32, leaf_type_layout: Arc<TypeLayout>) -> Self {
        Self {
            kind,
            count,
            leaf_type_layout,
            descriptor_ranges: Vec::new(),
            specialization: None,
        }
    }

    /// Add a physical descriptor range covering the whole binding range.
    pub fn with_descriptor_range(mut self, offset: u32) -> Self {
        self.descriptor_ranges.push(DescriptorRange {
            offset,
            count: self.count,
        });
        self
    }

    /// Record the concrete type an existential range was statically specialized to.
    pub fn with_specialization(mut self, type_layout: Arc<TypeLayout>) -> Self {
        self.specialization = Some(type_layout);
        self
    }

    /// Get the range kind.
    pub fn kind(&self) -> BindingRangeKind {
        self.kind
    }

    /// Get the number of array elements in the range.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Get the layout of one element of the range.
    pub fn leaf_type_layout(&self) -> &Arc<TypeLayout> {
        &self.leaf_type_layout
    }

    /// Get the physical descriptor ranges.
    pub fn descriptor_ranges(&self) -> &[DescriptorRange] {
        &self.descriptor_ranges
    }

    /// Offset of the first physical descriptor range, if any.
    pub fn first_descriptor_offset(&self) -> Option<u32> {
        self.descriptor_ranges.first().map(|range| range.offset)
    }

    /// Get the static specialization of an existential range.
    pub fn specialization(&self) -> Option<&Arc<TypeLayout>> {
        self.specialization.as_ref()
    }
}

/// A reflected range of nested sub-objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubObjectRangeReflection {
    binding_range_index: usize,
    offset: CategoryUsage,
}

impl SubObjectRangeReflection {
    /// Create a sub-object range for the given binding range.
    pub fn new(binding_range_index: usize, offset: CategoryUsage) -> Self {
        Self {
            binding_range_index,
            offset,
        }
    }

    /// Index of the owning binding range.
    pub fn binding_range_index(&self) -> usize {
        self.binding_range_index
    }

    /// Offset of the first element relative to the owning type.
    pub fn offset(&self) -> &CategoryUsage {
        &self.offset
    }
}

/// A reflected variable: a field, an entry point or the global scope.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableLayout {
    name: String,
    offsets: CategoryUsage,
    type_layout: Arc<TypeLayout>,
}

impl VariableLayout {
    /// Create a variable at offset zero in every category.
    pub fn new(name: impl Into<String>, type_layout: Arc<TypeLayout>) -> Self {
        Self {
            name: name.into(),
            offsets: CategoryUsage::default(),
            type_layout,
        }
    }

    /// Set the offset in one category.
    pub fn with_offset(mut self, category: ParameterCategory, offset: u32) -> Self {
        self.offsets.set(category, offset);
        self
    }

    /// Get the variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the offset in one category.
    pub fn offset(&self, category: ParameterCategory) -> u32 {
        self.offsets.get(category)
    }

    /// Get the byte offset of the variable's ordinary data.
    pub fn uniform_offset(&self) -> usize {
        self.offsets.get(ParameterCategory::Uniform) as usize
    }

    /// Get all offsets.
    pub fn offsets(&self) -> &CategoryUsage {
        &self.offsets
    }

    /// Get the variable's type layout.
    pub fn type_layout(&self) -> &Arc<TypeLayout> {
        &self.type_layout
    }
}

/// Reflected layout of one shader parameter type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeLayout {
    name: String,
    size: CategoryUsage,
    fields: Vec<VariableLayout>,
    element_type_layout: Option<Arc<TypeLayout>>,
    binding_ranges: Vec<BindingRangeReflection>,
    sub_object_ranges: Vec<SubObjectRangeReflection>,
    blob_layout: Option<Arc<TypeLayout>>,
}

impl TypeLayout {
    /// Start describing a type.
    pub fn builder(name: impl Into<String>) -> TypeLayoutBuilder {
        TypeLayoutBuilder::new(name)
    }

    /// Pure ordinary-data type of the given byte size (scalars, vectors, plain structs).
    pub fn uniform(name: impl Into<String>, size: u32) -> Arc<Self> {
        Self::builder(name).uniform_size(size).build()
    }

    /// Single-slot resource type in the given category.
    pub fn resource(name: impl Into<String>, category: ParameterCategory) -> Arc<Self> {
        Self::builder(name).slots(category, 1).build()
    }

    /// Get the type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the ordinary data in bytes.
    pub fn size(&self) -> usize {
        self.size.get(ParameterCategory::Uniform) as usize
    }

    /// Size in one category.
    pub fn size_in(&self, category: ParameterCategory) -> u32 {
        self.size.get(category)
    }

    /// Size in every category.
    pub fn usage(&self) -> &CategoryUsage {
        &self.size
    }

    /// Number of categories the type consumes space in.
    pub fn category_count(&self) -> usize {
        self.size.categories().count()
    }

    /// Whether the type consists of ordinary data only.
    pub fn is_pure_ordinary(&self) -> bool {
        self.category_count() == 1 && self.size.get(ParameterCategory::Uniform) != 0
    }

    /// Get the fields of an aggregate type.
    pub fn fields(&self) -> &[VariableLayout] {
        &self.fields
    }

    /// Element type of a container (`ConstantBuffer<T>`, `StructuredBuffer<T>`, ...).
    pub fn element_type_layout(&self) -> Option<&Arc<TypeLayout>> {
        self.element_type_layout.as_ref()
    }

    /// Get the logical binding ranges.
    pub fn binding_ranges(&self) -> &[BindingRangeReflection] {
        &self.binding_ranges
    }

    /// Get the sub-object ranges.
    pub fn sub_object_ranges(&self) -> &[SubObjectRangeReflection] {
        &self.sub_object_ranges
    }

    /// Alternate physical layout used by the binding-blob model, if it differs.
    pub fn blob_layout(&self) -> Option<&Arc<TypeLayout>> {
        self.blob_layout.as_ref()
    }
}

/// Shader stage an entry point runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Fragment (pixel) shader.
    Fragment,
    /// Compute shader.
    Compute,
}

/// Reflection of one entry point in a program.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPointReflection {
    name: String,
    stage: ShaderStage,
    var_layout: VariableLayout,
}

impl EntryPointReflection {
    /// Create an entry point whose parameters are described by `var_layout`.
    pub fn new(name: impl Into<String>, stage: ShaderStage, var_layout: VariableLayout) -> Self {
        Self {
            name: name.into(),
            stage,
            var_layout,
        }
    }

    /// Get the entry point name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the shader stage.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Variable layout of the entry point's parameter list.
    pub fn var_layout(&self) -> &VariableLayout {
        &self.var_layout
    }

    /// Type layout of the entry point's parameter list.
    pub fn type_layout(&self) -> &Arc<TypeLayout> {
        self.var_layout.type_layout()
    }
}

/// Reflection of a whole program: the global scope plus its entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramLayout {
    global_type_layout: Arc<TypeLayout>,
    entry_points: Vec<EntryPointReflection>,
}

impl ProgramLayout {
    /// Create a program layout with the given global scope.
    pub fn new(global_type_layout: Arc<TypeLayout>) -> Self {
        Self {
            global_type_layout,
            entry_points: Vec::new(),
        }
    }

    /// Add an entry point.
    pub fn with_entry_point(mut self, entry_point: EntryPointReflection) -> Self {
        self.entry_points.push(entry_point);
        self
    }

    /// Type layout of the global scope.
    pub fn global_type_layout(&self) -> &Arc<TypeLayout> {
        &self.global_type_layout
    }

    /// Get the entry points.
    pub fn entry_points(&self) -> &[EntryPointReflection] {
        &self.entry_points
    }
}
