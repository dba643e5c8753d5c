//! Binding error types.

use thiserror::Error;

use crate::types::ResourceTable;

/// Errors that can occur while building layouts or binding data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The backend lacks a capability required by the requested binding path.
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),
    /// A flat binding table would overflow.
    #[error("{table:?} table overflow: index {index} exceeds capacity {capacity}")]
    CapacityExceeded {
        /// The table that overflowed.
        table: ResourceTable,
        /// The index that was written.
        index: u32,
        /// The number of entries in the table.
        capacity: u32,
    },
    /// An existential sub-object has no resolved layout at bind time.
    #[error("binding range {binding_range_index} holds an existential value without a resolved layout")]
    UnresolvedExistentialBinding {
        /// Index of the binding range in its owning layout.
        binding_range_index: usize,
    },
    /// Reflection data is inconsistent.
    #[error("invalid reflection: {0}")]
    InvalidReflection(String),
    /// A bound resource range has no physical register or argument offset.
    #[error("binding range {binding_range_index} has no physical register offset")]
    MissingRegisterOffset {
        /// Index of the binding range in its owning layout.
        binding_range_index: usize,
    },
    /// A constant buffer or parameter block element was never populated.
    #[error("binding range {binding_range_index} is missing sub-object {array_index}")]
    MissingSubObject {
        /// Index of the binding range in its owning layout.
        binding_range_index: usize,
        /// Array element within the range.
        array_index: u32,
    },
    /// An object does not match the layout it is bound with.
    #[error("layout mismatch: {0}")]
    LayoutMismatch(String),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The object was finalized and can no longer be modified.
    #[error("shader object is finalized")]
    ObjectFinalized,
    /// The backend failed to create a transient buffer.
    #[error("buffer creation failed: {0}")]
    BufferCreationFailed(String),
}

/// Result alias used throughout the crate.
pub type BindingResult<T> = Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BindingError::CapabilityUnavailable("binding blobs".to_string());
        assert_eq!(err.to_string(), "capability unavailable: binding blobs");

        let err = BindingError::CapacityExceeded {
            table: ResourceTable::Texture,
            index: 4,
            capacity: 4,
        };
        assert_eq!(
            err.to_string(),
            "Texture table overflow: index 4 exceeds capacity 4"
        );

        let err = BindingError::UnresolvedExistentialBinding {
            binding_range_index: 2,
        };
        assert!(err.to_string().contains("binding range 2"));
    }
}
