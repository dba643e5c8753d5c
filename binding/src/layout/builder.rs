//! Layout construction from reflection.

use std::sync::{Arc, OnceLock};

use crate::error::{BindingError, BindingResult};
use crate::offset::BindingOffset;
use crate::profile_scope;
use crate::reflection::{BindingRangeKind, BindingRangeReflection, TypeLayout};

use super::{BindingRange, ContainerKind, ResourceCounts, ShaderObjectLayout, SubObjectRange};

/// Resolve the binding-blob physical layout of a type.
///
/// The blob layout must describe the same logical binding ranges as the
/// default layout; only offsets and sizes may differ.
///
/// A blob type without fields must be empty or a single ordinary value;
/// resources or mixed data need fields to be placed in the blob.
pub(super) fn resolve_blob_layout(type_layout: &Arc<TypeLayout>) -> BindingResult<Arc<TypeLayout>> {
    let Some(blob) = type_layout.blob_layout() else {
        check_blob_fields(type_layout)?;
        return Ok(Arc::clone(type_layout));
    };

    let default_ranges = type_layout.binding_ranges();
    let blob_ranges = blob.binding_ranges();
    if default_ranges.len() != blob_ranges.len() {
        return Err(BindingError::InvalidReflection(format!(
            "blob layout of `{}` has {} binding ranges, default layout has {}",
            type_layout.name(),
            blob_ranges.len(),
            default_ranges.len()
        )));
    }
    for (index, (default, blob)) in default_ranges.iter().zip(blob_ranges).enumerate() {
        if default.kind() != blob.kind() || default.count() != blob.count() {
            return Err(BindingError::InvalidReflection(format!(
                "blob layout of `{}` disagrees on binding range {index}: {:?}[{}] vs {:?}[{}]",
                type_layout.name(),
                blob.kind(),
                blob.count(),
                default.kind(),
                default.count()
            )));
        }
    }
    check_blob_fields(blob)?;
    Ok(Arc::clone(blob))
}

fn check_blob_fields(blob: &TypeLayout) -> BindingResult<()> {
    if !blob.fields().is_empty() {
        return Ok(());
    }
    if !blob.binding_ranges().is_empty() {
        return Err(BindingError::InvalidReflection(format!(
            "blob layout of `{}` has {} binding ranges but no fields",
            blob.name(),
            blob.binding_ranges().len()
        )));
    }
    if blob.size() > 0 && !blob.is_pure_ordinary() {
        return Err(BindingError::InvalidReflection(format!(
            "blob layout of `{}` mixes {} ordinary bytes with resources but has no fields",
            blob.name(),
            blob.size()
        )));
    }
    Ok(())
}

pub(super) fn build(
    element_type_layout: &Arc<TypeLayout>,
    container: ContainerKind,
) -> BindingResult<ShaderObjectLayout> {
    profile_scope!("ShaderObjectLayout::build");

    let blob_type_layout = OnceLock::new();
    let physical = match container {
        ContainerKind::Plain => Arc::clone(element_type_layout),
        ContainerKind::ParameterBlock => {
            let blob = resolve_blob_layout(element_type_layout)?;
            let _ = blob_type_layout.set(Arc::clone(&blob));
            blob
        }
    };

    let total_ordinary_data_size = physical.size();
    let mut resource_counts = ResourceCounts::default();
    if total_ordinary_data_size > 0 {
        resource_counts.buffers += 1;
    }

    let mut slot_count = 0u32;
    let mut sub_object_count = 0u32;
    let mut binding_ranges = Vec::with_capacity(physical.binding_ranges().len());

    for reflected in physical.binding_ranges() {
        let kind = reflected.kind();
        let count = reflected.count();
        let slot_index = slot_count;
        let mut sub_object_index = None;

        if kind.is_sub_object() {
            sub_object_index = Some(sub_object_count);
            sub_object_count += count;
            // The parent holds one buffer slot per block for the blob address.
            if kind == BindingRangeKind::ParameterBlock {
                resource_counts.buffers += count;
            }
        } else if let Some(table) = kind.resource_table() {
            if kind.is_raw_buffer() && reflected.leaf_type_layout().element_type_layout().is_some() {
                sub_object_index = Some(sub_object_count);
                sub_object_count += count;
            }
            slot_count += count;
            resource_counts.add_slots(table, count);
        }

        binding_ranges.push(BindingRange {
            kind,
            count,
            slot_index,
            register_offset: reflected.first_descriptor_offset(),
            sub_object_index,
        });
    }

    let mut total_resource_counts = resource_counts;
    let mut sub_object_ranges = Vec::with_capacity(physical.sub_object_ranges().len());

    for reflected in physical.sub_object_ranges() {
        let binding_range_index = reflected.binding_range_index();
        let range = physical
            .binding_ranges()
            .get(binding_range_index)
            .ok_or_else(|| {
                BindingError::InvalidReflection(format!(
                    "`{}` has a sub-object range for binding range {binding_range_index}, \
                     but only {} binding ranges",
                    physical.name(),
                    physical.binding_ranges().len()
                ))
            })?;

        let layout = nested_layout(physical.name(), range)?;
        if let Some(nested) = &layout {
            if range.kind() != BindingRangeKind::ParameterBlock {
                total_resource_counts += *nested.total_resource_counts() * range.count();
            }
        }

        sub_object_ranges.push(SubObjectRange {
            binding_range_index,
            layout,
            offset: BindingOffset::from_usage(reflected.offset()),
            stride: BindingOffset::from_type_layout(range.leaf_type_layout()),
        });
    }

    log::debug!(
        "ShaderObjectLayout: built {:?} layout for `{}` ({} ranges, {} sub-objects, {:?} total slots)",
        container,
        element_type_layout.name(),
        binding_ranges.len(),
        sub_object_ranges.len(),
        total_resource_counts
    );

    Ok(ShaderObjectLayout {
        element_type_layout: Arc::clone(element_type_layout),
        container,
        binding_ranges,
        sub_object_ranges,
        slot_count,
        sub_object_count,
        resource_counts,
        total_resource_counts,
        total_ordinary_data_size,
        blob_type_layout,
    })
}

fn nested_layout(
    owner: &str,
    range: &BindingRangeReflection,
) -> BindingResult<Option<Arc<ShaderObjectLayout>>> {
    let kind = range.kind();
    match kind {
        BindingRangeKind::ConstantBuffer => {
            let element = element_type_of(owner, range)?;
            ShaderObjectLayout::create_for_element_type(element, ContainerKind::Plain).map(Some)
        }
        BindingRangeKind::ParameterBlock => {
            let element = element_type_of(owner, range)?;
            ShaderObjectLayout::create_for_element_type(element, ContainerKind::ParameterBlock)
                .map(Some)
        }
        BindingRangeKind::ExistentialValue => range
            .specialization()
            .map(|concrete| ShaderObjectLayout::create_for_element_type(concrete, ContainerKind::Plain))
            .transpose(),
        BindingRangeKind::RawBuffer | BindingRangeKind::MutableRawBuffer => {
            let element = element_type_of(owner, range)?;
            ShaderObjectLayout::create_for_element_type(element, ContainerKind::Plain).map(Some)
        }
        _ => Err(BindingError::InvalidReflection(format!(
            "`{owner}` declares a sub-object range over a {kind:?} binding range"
        ))),
    }
}

fn element_type_of<'a>(
    owner: &str,
    range: &'a BindingRangeReflection,
) -> BindingResult<&'a Arc<TypeLayout>> {
    range.leaf_type_layout().element_type_layout().ok_or_else(|| {
        BindingError::InvalidReflection(format!(
            "{:?} range `{}` in `{owner}` has no element type",
            range.kind(),
            range.leaf_type_layout().name()
        ))
    })
}
