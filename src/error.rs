//! Errors.

use thiserror::Error;

/// Errors reported by views, cores and providers.
///
/// Structural defects (such as creating a core for a view whose parent has no core) are not
/// represented here; they panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A length unit tag or suffix that does not name a known unit.
    #[error("invalid length unit: {0}")]
    InvalidUnit(String),

    /// An argument outside of the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The UI provider has no core factory for this core type.
    #[error("view core type `{0}` is not supported by this UI provider")]
    UnsupportedCoreType(String),

    /// The core has been disposed and can no longer change native state.
    #[error("view core has already been disposed")]
    Disposed,

    /// A foreign field could not be resolved on a class.
    #[error("field `{name}` with signature `{signature}` not found on class `{class}`")]
    FieldNotFound {
        class: String,
        name: String,
        signature: String,
    },

    /// A foreign method could not be resolved on a class.
    #[error("method `{name}` with signature `{signature}` not found on class `{class}`")]
    MethodNotFound {
        class: String,
        name: String,
        signature: String,
    },

    /// A foreign field held a value of an unexpected type.
    #[error("field `{name}` holds a value that is not of type `{signature}`")]
    FieldType { name: String, signature: String },
}

pub type Result<T> = std::result::Result<T, Error>;
