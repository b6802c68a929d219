//! Errores de persistencia.
//! Mapea errores de Diesel / conexión a variantes semánticas del destino.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use jira_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("unresolved field_id collision: {0}")]
    UnresolvedCollision(String),
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("not found")]
    NotFound,
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation => Self::UniqueViolation(info.message().to_string()),
                DatabaseErrorKind::CheckViolation => Self::CheckViolation(info.message().to_string()),
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                DatabaseErrorKind::ClosedConnection => Self::TransientIo(info.message().to_string()),
                other => Self::Unknown(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::DeserializationError(e) => Self::Unknown(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Unknown(format!("ser: {e}")),
            DieselError::AlreadyInTransaction => Self::Unknown("already in transaction".into()),
            DieselError::RollbackErrorOnCommit { rollback_error, commit_error } => {
                Self::Unknown(format!("rollback={rollback_error}; commit={commit_error}"))
            }
            DieselError::BrokenTransactionManager => Self::TransientIo("broken transaction manager".into()),
            DieselError::QueryBuilderError(e) => Self::Unknown(format!("query builder: {e}")),
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnresolvedCollision(id) => Self::UnresolvedCollision(id),
            DomainError::NotFound(_) => Self::NotFound,
            DomainError::ValidationError(msg) => Self::Config(msg),
        }
    }
}
