use thiserror::Error;

/// Errores del dominio de aplanado.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unresolved field_id collision: {0}")]
    UnresolvedCollision(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("Error de validación: {0}")]
    ValidationError(String),
}
