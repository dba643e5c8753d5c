//! Builder for reflected type layouts.

use std::sync::Arc;

use super::{
    BindingRangeReflection, CategoryUsage, ParameterCategory, SubObjectRangeReflection,
    TypeLayout, VariableLayout,
};

/// Fluent builder for [`TypeLayout`].
///
/// Performs no validation; inconsistencies are reported when a shader
/// object layout is created from the finished description.
#[derive(Debug, Clone)]
pub struct TypeLayoutBuilder {
    layout: TypeLayout,
}

impl TypeLayoutBuilder {
    /// Create a builder for an empty type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            layout: TypeLayout {
                name: name.into(),
                size: CategoryUsage::default(),
                fields: Vec::new(),
                element_type_layout: None,
                binding_ranges: Vec::new(),
                sub_object_ranges: Vec::new(),
                blob_layout: None,
            },
        }
    }

    /// Set the ordinary-data size in bytes.
    pub fn uniform_size(self, size: u32) -> Self {
        self.slots(ParameterCategory::Uniform, size)
    }

    /// Set the size in one category.
    pub fn slots(mut self, category: ParameterCategory, amount: u32) -> Self {
        self.layout.size.set(category, amount);
        self
    }

    /// Append a field.
    pub fn field(mut self, field: VariableLayout) -> Self {
        self.layout.fields.push(field);
        self
    }

    /// Set the element type of a container type.
    pub fn element_type(mut self, element: Arc<TypeLayout>) -> Self {
        self.layout.element_type_layout = Some(element);
        self
    }

    /// Append a logical binding range.
    pub fn binding_range(mut self, range: BindingRangeReflection) -> Self {
        self.layout.binding_ranges.push(range);
        self
    }

    /// Append a sub-object range.
    pub fn sub_object_range(mut self, range: SubObjectRangeReflection) -> Self {
        self.layout.sub_object_ranges.push(range);
        self
    }

    /// Attach the binding-blob physical layout of this type.
    pub fn blob_layout(mut self, blob_layout: Arc<TypeLayout>) -> Self {
        self.layout.blob_layout = Some(blob_layout);
        self
    }

    /// Finish the description.
    pub fn build(self) -> Arc<TypeLayout> {
        Arc::new(self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::BindingRangeKind;

    #[test]
    fn test_builder_collects_members() {
        let texture = TypeLayout::resource("Texture2D", ParameterCategory::Texture);
        let ty = TypeLayout::builder("Material")
            .uniform_size(16)
            .slots(ParameterCategory::Texture, 1)
            .field(VariableLayout::new("tint", TypeLayout::uniform("float4", 16)))
            .field(VariableLayout::new("albedo", texture.clone()))
            .binding_range(
                BindingRangeReflection::new(BindingRangeKind::Texture, 1, texture)
                    .with_descriptor_range(0),
            )
            .build();

        assert_eq!(ty.name(), "Material");
        assert_eq!(ty.size(), 16);
        assert_eq!(ty.fields().len(), 2);
        assert_eq!(ty.binding_ranges()[0].first_descriptor_offset(), Some(0));
        assert_eq!(ty.category_count(), 2);
        assert!(ty.blob_layout().is_none());
    }
}
