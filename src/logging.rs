//! Suscriptor de logs para los binarios.
//!
//! Las crates de la librería usan las macros de `log`; aquí se instala un
//! suscriptor `tracing-subscriber` que también recibe esos registros. El
//! nivel se controla con `RUST_LOG` (por defecto `info`).

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Instala el suscriptor global. Devuelve `false` si ya había uno (el
/// existente se conserva).
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_target(false)
                             .with_writer(std::io::stderr)
                             .try_init()
                             .is_ok()
}
