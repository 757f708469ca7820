use datex_types::TypeRef;
use thiserror::Error;

use crate::capability::Action;

/// Errors from type configuration, registry lookups and dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("a type is required for a type configuration")]
    MissingType,

    #[error("the class or prototype is required for the configuration of {0}")]
    MissingClassOrPrototype(TypeRef),

    #[error("could not load type {0}")]
    TypeNotLoaded(TypeRef),

    #[error("type {0} has no native class")]
    NoClassBound(TypeRef),

    #[error("type configuration loader failed: {0}")]
    Loader(String),

    #[error("capability hook failed: {0}")]
    Hook(String),

    #[error("invalid value for {0} assign action")]
    InvalidActionValue(Action),

    #[error("{0} assign action not implemented for type")]
    ActionNotImplemented(Action),
}

/// Result type for interface operations
pub type Result<T> = std::result::Result<T, InterfaceError>;
