//! JiraFlow Rust Library
//!
//! Este crate actúa como la librería central de JiraFlow:
//! - Expone `config` para leer la configuración de una corrida.
//! - Expone `pipeline` con las dos operaciones (migración de una issue y
//!   sincronización del catálogo de campos).
//! - Expone `errors` con el error agregado y los códigos de salida.
//!
//! Los binarios `jiraflow` y `field-catalog` son capas delgadas sobre esto.

pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;

pub use config::{AppConfig, RunConfig};
pub use errors::AppError;
pub use pipeline::{migrate_issue, sync_field_catalog, RunError, RunOutcome};
