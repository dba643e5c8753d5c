//! Binding behaviour configuration.

/// What to do when an existential sub-object has no resolved layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnresolvedExistentialPolicy {
    /// Abort the encode with [`BindingError::UnresolvedExistentialBinding`](crate::BindingError::UnresolvedExistentialBinding).
    #[default]
    Fail,
    /// Bind nothing for the element and continue.
    Skip,
}

/// Configuration for [`BindingDataBuilder`](crate::binding::BindingDataBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingConfig {
    /// Policy for existential sub-objects without a resolved layout.
    pub unresolved_existential: UnresolvedExistentialPolicy,
    /// Prefix for debug labels of transient buffers.
    pub label_prefix: String,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            unresolved_existential: UnresolvedExistentialPolicy::Fail,
            label_prefix: "binding".to_string(),
        }
    }
}

impl BindingConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unresolved existential policy.
    pub fn with_unresolved_existential(mut self, policy: UnresolvedExistentialPolicy) -> Self {
        self.unresolved_existential = policy;
        self
    }

    /// Set the label prefix for transient buffers.
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    pub(crate) fn label(&self, what: &str, type_name: &str) -> String {
        format!("{}:{}:{}", self.label_prefix, what, type_name)
    }
}
