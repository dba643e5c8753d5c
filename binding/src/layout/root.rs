//! Program-level layout: global scope plus entry points.

use std::sync::Arc;

use crate::error::BindingResult;
use crate::offset::BindingOffset;
use crate::profile_scope;
use crate::reflection::{ProgramLayout, ShaderStage};

use super::{ContainerKind, ResourceCounts, ShaderObjectLayout};

/// Layout of one entry point's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPointLayout {
    /// Entry point name.
    pub name: String,
    /// Shader stage.
    pub stage: ShaderStage,
    /// Layout of the parameter list.
    pub layout: Arc<ShaderObjectLayout>,
    /// Absolute offset of the parameters in the flat tables.
    pub offset: BindingOffset,
}

/// Layout of a whole program.
#[derive(Debug, Clone, PartialEq)]
pub struct RootShaderObjectLayout {
    global: Arc<ShaderObjectLayout>,
    entry_points: Vec<EntryPointLayout>,
    total_resource_counts: ResourceCounts,
}

impl RootShaderObjectLayout {
    /// Build the layout of a program.
    pub fn create(program: &ProgramLayout) -> BindingResult<Arc<Self>> {
        profile_scope!("RootShaderObjectLayout::create");

        let global = ShaderObjectLayout::create_for_element_type(
            program.global_type_layout(),
            ContainerKind::Plain,
        )?;
        let mut total_resource_counts = *global.total_resource_counts();

        let mut entry_points = Vec::with_capacity(program.entry_points().len());
        for entry_point in program.entry_points() {
            let layout = ShaderObjectLayout::create_for_element_type(
                entry_point.type_layout(),
                ContainerKind::Plain,
            )?;
            total_resource_counts += *layout.total_resource_counts();
            entry_points.push(EntryPointLayout {
                name: entry_point.name().to_string(),
                stage: entry_point.stage(),
                layout,
                offset: BindingOffset::from_reflection(entry_point.var_layout()),
            });
        }

        log::debug!(
            "RootShaderObjectLayout: {} entry points, {:?} total slots",
            entry_points.len(),
            total_resource_counts
        );

        Ok(Arc::new(Self {
            global,
            entry_points,
            total_resource_counts,
        }))
    }

    /// Layout of the global scope.
    pub fn global(&self) -> &Arc<ShaderObjectLayout> {
        &self.global
    }

    /// Entry point layouts in program order.
    pub fn entry_points(&self) -> &[EntryPointLayout] {
        &self.entry_points
    }

    /// Find an entry point by name.
    pub fn entry_point(&self, name: &str) -> Option<&EntryPointLayout> {
        self.entry_points.iter().find(|entry| entry.name == name)
    }

    /// Flat slots needed to bind the whole program.
    pub fn total_resource_counts(&self) -> &ResourceCounts {
        &self.total_resource_counts
    }
}
