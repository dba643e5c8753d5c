//! Cache for sharing layouts between shader objects and threads.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{BindingError, BindingResult};
use crate::reflection::TypeLayout;

use super::{ContainerKind, ShaderObjectLayout};

/// Shares [`ShaderObjectLayout`]s between objects of the same type.
///
/// Types are keyed by name, so reflection adapters must hand out unique
/// (fully specialized) type names. Failed builds are never inserted.
#[derive(Debug, Default)]
pub struct LayoutCache {
    layouts: RwLock<HashMap<(String, ContainerKind), Arc<ShaderObjectLayout>>>,
}

impl LayoutCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or build the layout for a type.
    pub fn get_or_create(
        &self,
        element_type_layout: &Arc<TypeLayout>,
        container: ContainerKind,
    ) -> BindingResult<Arc<ShaderObjectLayout>> {
        let key = (element_type_layout.name().to_string(), container);

        // Fast path: read lock
        if let Some(layout) = self.layouts.read().get(&key) {
            return Self::checked(layout, element_type_layout);
        }

        // Build outside the lock; another thread may win the race.
        let built = ShaderObjectLayout::create_for_element_type(element_type_layout, container)?;
        let mut layouts = self.layouts.write();
        let layout = layouts.entry(key).or_insert(built);
        Self::checked(layout, element_type_layout)
    }

    /// Number of cached layouts.
    pub fn len(&self) -> usize {
        self.layouts.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.layouts.read().is_empty()
    }

    /// Drop every cached layout.
    pub fn clear(&self) {
        self.layouts.write().clear();
    }

    fn checked(
        layout: &Arc<ShaderObjectLayout>,
        element_type_layout: &Arc<TypeLayout>,
    ) -> BindingResult<Arc<ShaderObjectLayout>> {
        let cached = layout.element_type_layout();
        if Arc::ptr_eq(cached, element_type_layout) || **cached == **element_type_layout {
            Ok(Arc::clone(layout))
        } else {
            Err(BindingError::LayoutMismatch(format!(
                "two different types are named `{}`",
                element_type_layout.name()
            )))
        }
    }
}
