//! Errores de la aplicación (binarios y orquestación).

pub mod app_error;

pub use app_error::{AppError, EXIT_CONFIG, EXIT_FETCH, EXIT_PERSISTENCE};
