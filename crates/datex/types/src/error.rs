use thiserror::Error;

/// Errors from the type identity service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid type name: {0}")]
    InvalidTypeName(String),

    #[error("unterminated type parameters in {0}")]
    UnterminatedParameters(String),
}
