//! Binding blob (argument buffer) serialization.
//!
//! A blob holds an object's ordinary data followed, at the byte offsets of
//! the blob physical layout, by one 8-byte little-endian value per bound
//! element: buffer device addresses (plus the bound range offset), texture
//! and sampler resource ids, and the device addresses of nested blobs.

use std::sync::Arc;

use crate::error::{BindingError, BindingResult};
use crate::object::ShaderObject;
use crate::profile_scope;
use crate::reflection::{BindingRangeKind, TypeLayout};
use crate::types::{BufferDescriptor, ResourceKind};

use super::{required_sub_object, resource_slot, BindingBlob, BindingData, BindingDataBuilder};

/// Size of one address or resource id in a blob.
const ENTRY_SIZE: usize = 8;

impl BindingDataBuilder<'_> {
    /// Serialize an object into a new binding blob.
    ///
    /// Returns `None` without allocating when the blob layout has no fields
    /// and no ordinary data.
    /// Nested constant buffers and parameter blocks are serialized first and
    /// linked by device address. Resources referenced only through the blob
    /// are recorded in the residency lists of `data`. The blob is owned by
    /// the binding cache, also when serialization fails.
    pub fn write_binding_blob(
        &mut self,
        data: &mut BindingData,
        object: &ShaderObject,
    ) -> BindingResult<Option<BindingBlob>> {
        profile_scope!("write_binding_blob");

        let layout = object.layout();
        let blob_type = Arc::clone(layout.blob_type_layout()?);
        if blob_type.fields().is_empty() && blob_type.size() == 0 {
            return Ok(None);
        }

        let descriptor = BufferDescriptor::binding_blob(blob_type.size() as u64).with_label(
            self.config
                .label("blob", layout.element_type_layout().name()),
        );
        let mut buffer = self.backend.create_transient_buffer(&descriptor)?;
        let blob = BindingBlob::from_buffer(buffer.as_ref());

        let written = self.fill_binding_blob(data, object, &blob_type, buffer.contents_mut());
        self.cache.own(buffer);
        written.map(|()| Some(blob))
    }

    fn fill_binding_blob(
        &mut self,
        data: &mut BindingData,
        object: &ShaderObject,
        blob_type: &TypeLayout,
        contents: &mut [u8],
    ) -> BindingResult<()> {
        let layout = object.layout();

        // Ordinary data goes in before any handle bytes.
        copy_ordinary_data(
            contents,
            0,
            blob_type,
            object.data(),
            0,
            layout.element_type_layout(),
        )?;

        let physical_ranges = blob_type.binding_ranges();
        for (binding_range_index, (range, physical)) in
            layout.binding_ranges().iter().zip(physical_ranges).enumerate()
        {
            if range.kind.resource_table().is_none() {
                continue;
            }
            for i in 0..range.count {
                let slot = resource_slot(object, range, i)?;
                let Some(resource) = slot.resource else {
                    continue;
                };
                let base = physical
                    .first_descriptor_offset()
                    .ok_or(BindingError::MissingRegisterOffset { binding_range_index })?;

                let value = match resource.kind() {
                    ResourceKind::Buffer => {
                        resource.gpu_value() + slot.buffer_range.map_or(0, |range| range.offset)
                    }
                    ResourceKind::TextureView | ResourceKind::Sampler => resource.gpu_value(),
                };
                write_entry(contents, base as usize + i as usize * ENTRY_SIZE, value)?;

                // Samplers are not device allocations and need no residency.
                if range.kind.is_mutable() {
                    data.used_rw_resources.push(resource);
                } else if resource.kind() != ResourceKind::Sampler {
                    data.used_resources.push(resource);
                }
            }
        }

        for sub_range in layout.sub_object_ranges() {
            let binding_range_index = sub_range.binding_range_index;
            let Some(range) = layout.binding_range(binding_range_index) else {
                continue;
            };
            // Resolved existentials carry no blob entry of their own.
            if range.kind == BindingRangeKind::ExistentialValue {
                if sub_range.layout.is_none() {
                    for i in 0..range.count {
                        self.unresolved_existential(object, sub_range, i)?;
                    }
                }
                continue;
            }
            if !matches!(
                range.kind,
                BindingRangeKind::ConstantBuffer | BindingRangeKind::ParameterBlock
            ) {
                continue;
            }
            let Some(first) = range.sub_object_index else {
                continue;
            };
            let base = physical_ranges
                .get(binding_range_index)
                .and_then(|physical| physical.first_descriptor_offset())
                .ok_or(BindingError::MissingRegisterOffset { binding_range_index })?;

            for i in 0..range.count {
                let nested = required_sub_object(object, sub_range, i, first + i)?;
                let Some(nested_blob) = self.write_binding_blob(data, nested)? else {
                    continue;
                };
                write_entry(
                    contents,
                    base as usize + i as usize * ENTRY_SIZE,
                    nested_blob.device_address,
                )?;
                if range.kind == BindingRangeKind::ParameterBlock {
                    data.used_resources.push(nested_blob.resource_handle());
                }
            }
        }
        Ok(())
    }
}

/// Copy ordinary bytes from the default layout into the blob layout.
///
/// Both type layouts are walked in lockstep: a pure ordinary-data subtree
/// is copied in one piece, a subtree that mixes ordinary data with
/// resources is copied field by field.
fn copy_ordinary_data(
    dst: &mut [u8],
    dst_offset: usize,
    blob_type: &TypeLayout,
    src: &[u8],
    src_offset: usize,
    default_type: &TypeLayout,
) -> BindingResult<()> {
    let size = default_type.size();
    if size == 0 {
        return Ok(());
    }

    if default_type.is_pure_ordinary() {
        let source = src.get(src_offset..src_offset + size);
        let target = dst.get_mut(dst_offset..dst_offset + size);
        return match (source, target) {
            (Some(source), Some(target)) => {
                target.copy_from_slice(source);
                Ok(())
            }
            _ => Err(BindingError::LayoutMismatch(format!(
                "{size} ordinary bytes of `{}` do not fit (source {src_offset}/{}, blob {dst_offset}/{})",
                default_type.name(),
                src.len(),
                dst.len()
            ))),
        };
    }

    if default_type.fields().is_empty() {
        return Err(BindingError::LayoutMismatch(format!(
            "`{}` mixes {size} ordinary bytes with resources but has no fields",
            default_type.name()
        )));
    }
    if blob_type.fields().len() != default_type.fields().len() {
        return Err(BindingError::LayoutMismatch(format!(
            "blob layout of `{}` has {} fields, default layout has {}",
            default_type.name(),
            blob_type.fields().len(),
            default_type.fields().len()
        )));
    }
    for (blob_field, default_field) in blob_type.fields().iter().zip(default_type.fields()) {
        copy_ordinary_data(
            dst,
            dst_offset + blob_field.uniform_offset(),
            blob_field.type_layout(),
            src,
            src_offset + default_field.uniform_offset(),
            default_field.type_layout(),
        )?;
    }
    Ok(())
}

fn write_entry(contents: &mut [u8], offset: usize, value: u64) -> BindingResult<()> {
    let len = contents.len();
    let entry = contents
        .get_mut(offset..offset + ENTRY_SIZE)
        .ok_or_else(|| {
            BindingError::LayoutMismatch(format!(
                "blob entry at {offset} exceeds the {len}-byte blob"
            ))
        })?;
    entry.copy_from_slice(&value.to_le_bytes());
    Ok(())
}
