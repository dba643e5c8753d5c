//! Common fixtures for binding integration tests.
//!
//! Reflection descriptions are written by hand the way a reflection adapter
//! would produce them for:
//!
//! ```hlsl
//! struct Light { float3 dir; };
//! struct Params {
//!     float4 tint;
//!     Texture2D img;
//!     SamplerState smp;
//!     ConstantBuffer<Light> light;
//! };
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use redlilium_shader_binding::reflection::{
    BindingRangeKind, BindingRangeReflection, CategoryUsage, EntryPointReflection,
    ParameterCategory, ProgramLayout, ShaderStage, SubObjectRangeReflection, TypeLayout,
    VariableLayout,
};
use redlilium_shader_binding::{
    BackendCapabilities, BindingCache, DummyBackend, NativeHandle, ResourceHandle,
    RootShaderObject, RootShaderObjectLayout, ShaderObject, ShaderObjectLayout, ShaderOffset,
};

/// Install a test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Backend Enumeration
// ============================================================================

/// Binding model exercised by a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    /// Flat slot tables only.
    Flat,
    /// Flat slot tables plus binding blobs for parameter blocks.
    Blob,
}

impl Model {
    /// Create a dummy backend for this model.
    pub fn backend(self) -> DummyBackend {
        match self {
            Model::Flat => DummyBackend::new().with_capabilities(BackendCapabilities::empty()),
            Model::Blob => DummyBackend::new(),
        }
    }
}

/// Backend plus binding cache for one encode operation.
pub struct TestContext {
    pub backend: DummyBackend,
    pub cache: BindingCache,
}

impl TestContext {
    pub fn new(model: Model) -> Self {
        init_logging();
        Self {
            backend: model.backend(),
            cache: BindingCache::new(),
        }
    }
}

// ============================================================================
// Resource handles
// ============================================================================

pub fn texture_handle(id: u64) -> ResourceHandle {
    ResourceHandle::texture_view(NativeHandle(1000 + id), 0xA000 + id)
}

pub fn sampler_handle(id: u64) -> ResourceHandle {
    ResourceHandle::sampler(NativeHandle(2000 + id), 0xB000 + id)
}

pub fn buffer_handle(id: u64) -> ResourceHandle {
    ResourceHandle::buffer(NativeHandle(3000 + id), 0xC000_0000 + id * 0x1000)
}

// ============================================================================
// Leaf types
// ============================================================================

pub fn texture_type() -> Arc<TypeLayout> {
    TypeLayout::resource("Texture2D", ParameterCategory::Texture)
}

pub fn rw_texture_type() -> Arc<TypeLayout> {
    TypeLayout::resource("RWTexture2D", ParameterCategory::Texture)
}

pub fn sampler_type() -> Arc<TypeLayout> {
    TypeLayout::resource("SamplerState", ParameterCategory::Sampler)
}

pub fn resource_id_type() -> Arc<TypeLayout> {
    TypeLayout::uniform("resource_id", 8)
}

/// `ConstantBuffer<T>` for an element type occupying one buffer slot itself.
pub fn constant_buffer_type(element: Arc<TypeLayout>) -> Arc<TypeLayout> {
    let mut builder = TypeLayout::builder(format!("ConstantBuffer<{}>", element.name()));
    for category in ParameterCategory::ALL {
        let amount = match category {
            ParameterCategory::Uniform => 0,
            ParameterCategory::Buffer => {
                element.size_in(category) + u32::from(element.size_in(ParameterCategory::Uniform) > 0)
            }
            _ => element.size_in(category),
        };
        builder = builder.slots(category, amount);
    }
    builder.element_type(element).build()
}

/// `ParameterBlock<T>`, one buffer slot in the parent.
pub fn parameter_block_type(element: Arc<TypeLayout>) -> Arc<TypeLayout> {
    TypeLayout::builder(format!("ParameterBlock<{}>", element.name()))
        .slots(ParameterCategory::Buffer, 1)
        .element_type(element)
        .build()
}

// ============================================================================
// Light / Params
// ============================================================================

pub fn light_type() -> Arc<TypeLayout> {
    TypeLayout::builder("Light")
        .uniform_size(12)
        .field(VariableLayout::new("dir", TypeLayout::uniform("float3", 12)))
        .build()
}

/// Byte layout of `Params` inside a binding blob.
pub const PARAMS_BLOB_IMG: usize = 16;
pub const PARAMS_BLOB_SMP: usize = 24;
pub const PARAMS_BLOB_LIGHT: usize = 32;
pub const PARAMS_BLOB_SIZE: usize = 40;

pub fn params_type() -> Arc<TypeLayout> {
    let light_cb = constant_buffer_type(light_type());

    let blob = TypeLayout::builder("Params")
        .uniform_size(PARAMS_BLOB_SIZE as u32)
        .field(VariableLayout::new("tint", TypeLayout::uniform("float4", 16)))
        .field(
            VariableLayout::new("img", resource_id_type())
                .with_offset(ParameterCategory::Uniform, PARAMS_BLOB_IMG as u32),
        )
        .field(
            VariableLayout::new("smp", resource_id_type())
                .with_offset(ParameterCategory::Uniform, PARAMS_BLOB_SMP as u32),
        )
        .field(
            VariableLayout::new("light", TypeLayout::uniform("device_address", 8))
                .with_offset(ParameterCategory::Uniform, PARAMS_BLOB_LIGHT as u32),
        )
        .binding_range(
            BindingRangeReflection::new(BindingRangeKind::Texture, 1, texture_type())
                .with_descriptor_range(PARAMS_BLOB_IMG as u32),
        )
        .binding_range(
            BindingRangeReflection::new(BindingRangeKind::Sampler, 1, sampler_type())
                .with_descriptor_range(PARAMS_BLOB_SMP as u32),
        )
        .binding_range(
            BindingRangeReflection::new(BindingRangeKind::ConstantBuffer, 1, light_cb.clone())
                .with_descriptor_range(PARAMS_BLOB_LIGHT as u32),
        )
        .sub_object_range(SubObjectRangeReflection::new(2, CategoryUsage::default()))
        .build();

    TypeLayout::builder("Params")
        .uniform_size(16)
        .slots(ParameterCategory::Buffer, 2)
        .slots(ParameterCategory::Texture, 1)
        .slots(ParameterCategory::Sampler, 1)
        .field(VariableLayout::new("tint", TypeLayout::uniform("float4", 16)))
        .field(VariableLayout::new("img", texture_type()))
        .field(VariableLayout::new("smp", sampler_type()))
        .field(
            VariableLayout::new("light", light_cb.clone())
                .with_offset(ParameterCategory::Buffer, 1),
        )
        .binding_range(
            BindingRangeReflection::new(BindingRangeKind::Texture, 1, texture_type())
                .with_descriptor_range(0),
        )
        .binding_range(
            BindingRangeReflection::new(BindingRangeKind::Sampler, 1, sampler_type())
                .with_descriptor_range(0),
        )
        .binding_range(
            BindingRangeReflection::new(BindingRangeKind::ConstantBuffer, 1, light_cb)
                .with_descriptor_range(1),
        )
        .sub_object_range(SubObjectRangeReflection::new(
            2,
            CategoryUsage::new().with(ParameterCategory::Buffer, 1),
        ))
        .blob_layout(blob)
        .build()
}

/// Program whose global scope is `Params`.
pub fn params_program() -> ProgramLayout {
    ProgramLayout::new(params_type())
}

/// Program whose global scope is `{ ParameterBlock<Params> block; }`.
pub fn params_block_program() -> ProgramLayout {
    let block = parameter_block_type(params_type());
    let globals = TypeLayout::builder("Globals")
        .slots(ParameterCategory::Buffer, 1)
        .field(VariableLayout::new("block", block.clone()))
        .binding_range(
            BindingRangeReflection::new(BindingRangeKind::ParameterBlock, 1, block)
                .with_descriptor_range(0),
        )
        .sub_object_range(SubObjectRangeReflection::new(0, CategoryUsage::default()))
        .build();
    ProgramLayout::new(globals)
}

pub const TINT: [f32; 4] = [0.25, 0.5, 0.75, 1.0];
pub const DIR: [f32; 3] = [0.0, -1.0, 0.0];

/// Populate a `Params` object, attaching a populated `Light`.
pub fn populate_params(params: &mut ShaderObject) {
    params.set_value(ShaderOffset::uniform(0), &TINT).unwrap();
    params
        .set_binding(ShaderOffset::binding(0, 0), texture_handle(1), None)
        .unwrap();
    params
        .set_binding(ShaderOffset::binding(1, 0), sampler_handle(1), None)
        .unwrap();

    let light_layout = light_layout_of(params.layout());
    let mut light = ShaderObject::new(&light_layout);
    light.set_value(ShaderOffset::uniform(0), &DIR).unwrap();
    light.finalize();
    params
        .set_object(ShaderOffset::binding(2, 0), Arc::new(light))
        .unwrap();
}

pub fn light_layout_of(params: &Arc<ShaderObjectLayout>) -> Arc<ShaderObjectLayout> {
    params.sub_object_ranges()[0]
        .layout
        .clone()
        .expect("light layout is resolved")
}

/// A populated root object for [`params_program`].
pub fn populated_params_root() -> RootShaderObject {
    let layout = RootShaderObjectLayout::create(&params_program()).unwrap();
    let mut root = RootShaderObject::new(&layout);
    populate_params(root.global_mut());
    root.finalize();
    root
}

/// A populated root object for [`params_block_program`].
pub fn populated_params_block_root() -> RootShaderObject {
    let layout = RootShaderObjectLayout::create(&params_block_program()).unwrap();
    let block_layout = layout.global().sub_object_ranges()[0]
        .layout
        .clone()
        .expect("parameter block layout is resolved");

    let mut block = ShaderObject::new(&block_layout);
    populate_params(&mut block);
    block.finalize();

    let mut root = RootShaderObject::new(&layout);
    root.global_mut()
        .set_object(ShaderOffset::binding(0, 0), Arc::new(block))
        .unwrap();
    root.finalize();
    root
}

/// Program with an entry point taking `uniform float4x4 mvp`.
pub fn program_with_entry_point(global: Arc<TypeLayout>, buffer_offset: u32) -> ProgramLayout {
    let params = TypeLayout::builder("vs_main.params")
        .uniform_size(64)
        .field(VariableLayout::new("mvp", TypeLayout::uniform("float4x4", 64)))
        .build();
    ProgramLayout::new(global).with_entry_point(EntryPointReflection::new(
        "vs_main",
        ShaderStage::Vertex,
        VariableLayout::new("vs_main", params)
            .with_offset(ParameterCategory::Buffer, buffer_offset),
    ))
}
