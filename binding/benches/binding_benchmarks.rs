use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use redlilium_shader_binding::reflection::{
    BindingRangeKind, BindingRangeReflection, CategoryUsage, ParameterCategory, ProgramLayout,
    SubObjectRangeReflection, TypeLayout, VariableLayout,
};
use redlilium_shader_binding::{
    BindingCache, BindingDataBuilder, ContainerKind, DummyBackend, LayoutCache, NativeHandle,
    ResourceHandle, RootShaderObject, RootShaderObjectLayout, ShaderObject, ShaderObjectLayout,
    ShaderOffset,
};

const TEXTURES: u32 = 8;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn texture() -> Arc<TypeLayout> {
    TypeLayout::resource("Texture2D", ParameterCategory::Texture)
}

/// `Material { float4 albedo; Texture2D maps[8]; }`, blob: albedo then 8 ids.
fn material_type() -> Arc<TypeLayout> {
    let blob = TypeLayout::builder("Material")
        .uniform_size(16 + 8 * TEXTURES)
        .field(VariableLayout::new("albedo", TypeLayout::uniform("float4", 16)))
        .field(
            VariableLayout::new("maps", TypeLayout::uniform("resource_id[8]", 8 * TEXTURES))
                .with_offset(ParameterCategory::Uniform, 16),
        )
        .binding_range(
            BindingRangeReflection::new(BindingRangeKind::Texture, TEXTURES, texture())
                .with_descriptor_range(16),
        )
        .build();
    TypeLayout::builder("Material")
        .uniform_size(16)
        .slots(ParameterCategory::Texture, TEXTURES)
        .field(VariableLayout::new("albedo", TypeLayout::uniform("float4", 16)))
        .field(VariableLayout::new("maps", texture()))
        .binding_range(
            BindingRangeReflection::new(BindingRangeKind::Texture, TEXTURES, texture())
                .with_descriptor_range(0),
        )
        .blob_layout(blob)
        .build()
}

/// `{ ConstantBuffer<Material> materials[4]; }`
fn scene_program() -> ProgramLayout {
    let material = material_type();
    let cb = TypeLayout::builder("ConstantBuffer<Material>")
        .slots(ParameterCategory::Buffer, 1)
        .slots(ParameterCategory::Texture, TEXTURES)
        .element_type(material)
        .build();
    let globals = TypeLayout::builder("Scene")
        .binding_range(BindingRangeReflection::new(BindingRangeKind::ConstantBuffer, 4, cb))
        .sub_object_range(SubObjectRangeReflection::new(0, CategoryUsage::default()))
        .build();
    ProgramLayout::new(globals)
}

fn populate_material(layout: &Arc<ShaderObjectLayout>) -> ShaderObject {
    let mut material = ShaderObject::new(layout);
    material
        .set_value(ShaderOffset::uniform(0), &[1.0f32; 4])
        .unwrap();
    for i in 0..TEXTURES {
        let handle = ResourceHandle::texture_view(NativeHandle(100 + u64::from(i)), u64::from(i));
        material
            .set_binding(ShaderOffset::binding(0, i), handle, None)
            .unwrap();
    }
    material.finalize();
    material
}

fn scene_root() -> RootShaderObject {
    let layout = RootShaderObjectLayout::create(&scene_program()).unwrap();
    let material_layout = layout.global().sub_object_ranges()[0].layout.clone().unwrap();
    let material = Arc::new(populate_material(&material_layout));

    let mut root = RootShaderObject::new(&layout);
    for i in 0..4 {
        root.global_mut()
            .set_object(ShaderOffset::binding(0, i), Arc::clone(&material))
            .unwrap();
    }
    root.finalize();
    root
}

// ---------------------------------------------------------------------------
// Layout construction
// ---------------------------------------------------------------------------

fn bench_root_layout_create(c: &mut Criterion) {
    let program = scene_program();
    c.bench_function("root_layout_create_4_materials", |b| {
        b.iter(|| black_box(RootShaderObjectLayout::create(&program).unwrap()));
    });
}

fn bench_layout_cache_hit(c: &mut Criterion) {
    let cache = LayoutCache::new();
    let material = material_type();
    cache.get_or_create(&material, ContainerKind::Plain).unwrap();

    c.bench_function("layout_cache_hit", |b| {
        b.iter(|| black_box(cache.get_or_create(&material, ContainerKind::Plain).unwrap()));
    });
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

fn bench_bind_as_root(c: &mut Criterion) {
    let backend = DummyBackend::new();
    let root = scene_root();

    c.bench_function("bind_as_root_4_materials", |b| {
        b.iter_batched(
            BindingCache::new,
            |mut cache| {
                let data = BindingDataBuilder::new(&backend, &mut cache)
                    .bind_as_root(&root)
                    .unwrap();
                black_box(data);
                cache
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_write_binding_blob(c: &mut Criterion) {
    let backend = DummyBackend::new();
    let layout =
        ShaderObjectLayout::create_for_element_type(&material_type(), ContainerKind::ParameterBlock)
            .unwrap();
    let material = populate_material(&layout);

    c.bench_function("write_binding_blob_8_textures", |b| {
        b.iter_batched(
            BindingCache::new,
            |mut cache| {
                let mut data = Default::default();
                let blob = BindingDataBuilder::new(&backend, &mut cache)
                    .write_binding_blob(&mut data, &material)
                    .unwrap();
                black_box((blob, data));
                cache
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_root_layout_create,
    bench_layout_cache_hit,
    bench_bind_as_root,
    bench_write_binding_blob,
);
criterion_main!(benches);
