//! Error types for the entity attribute model.
//!
//! All operations that can fail return typed errors rather than panicking.

use vivarium_types::EntityId;

/// Errors that can occur during entity attribute operations.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// Entity with the given ID was not found in the registry.
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    /// A numeric axis value was outside its declared range and could not be
    /// interpreted.
    #[error("axis value out of range: {axis} = {value}")]
    AxisOutOfRange {
        /// The axis name.
        axis: &'static str,
        /// The offending value.
        value: f64,
    },

    /// A persisted entity state carried a version newer than this build
    /// understands.
    #[error("unsupported state version {found}, this build supports <= {supported}")]
    UnsupportedStateVersion {
        /// The version found on the record.
        found: u32,
        /// The highest version this build can migrate.
        supported: u32,
    },
}
