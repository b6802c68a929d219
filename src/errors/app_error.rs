use jira_client::FetchError;
use jira_domain::DomainError;
use jira_persistence::PersistenceError;
use thiserror::Error;

use crate::pipeline::RunError;

pub const EXIT_CONFIG: u8 = 3;
pub const EXIT_FETCH: u8 = 4;
pub const EXIT_PERSISTENCE: u8 = 5;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error al consultar el tracker: {0}")]
    Fetch(#[from] FetchError),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Error de dominio: {0}")]
    Domain(#[from] DomainError),
}

impl AppError {
    /// Código de salida del proceso para este error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_)
            | AppError::Fetch(FetchError::Configuration(_))
            | AppError::Persistence(PersistenceError::Config(_))
            | AppError::Domain(DomainError::ValidationError(_)) => EXIT_CONFIG,
            AppError::Fetch(_) => EXIT_FETCH,
            AppError::Persistence(_) | AppError::Domain(_) => EXIT_PERSISTENCE,
        }
    }
}

impl From<RunError<FetchError, PersistenceError>> for AppError {
    fn from(err: RunError<FetchError, PersistenceError>) -> Self {
        match err {
            RunError::Fetch { error, .. } => AppError::Fetch(error),
            RunError::CreateTable(e) | RunError::Write(e) => AppError::Persistence(e),
        }
    }
}
