//! jira-persistence
//!
//! Destino Postgres (Diesel + r2d2) de las filas aplanadas.
//!
//! Módulos:
//! - `pg`: `PgFieldStore` (tabla de tres columnas) y `PgCatalogStore`
//!   (tabla `jira_fields`), pool y reintentos ante fallos transitorios.
//! - `config`: conexión desde variables de entorno / `.env`.
//! - `error`: mapeo de errores Diesel a variantes semánticas.
//! - `schema`: tablas Diesel con nombre fijo.

pub mod config;
pub mod error;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_pool, ConnectionProvider, PgCatalogStore, PgFieldStore, PgPool, PoolProvider};
