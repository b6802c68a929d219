//! Carga de configuración de conexión desde variables de entorno.
//!
//! `DATABASE_URL` tiene prioridad; si no existe se arma un conninfo de libpq
//! con `PG_HOST`, `PG_PORT`, `PG_DBNAME`, `PG_USER` y `PG_PASSWORD`.

use std::env;
use std::fmt;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::error::PersistenceError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env desde los binarios.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

pub const DEFAULT_TABLE: &str = "jira_fields_2";
pub const DEFAULT_PG_PORT: u16 = 5432;

#[derive(Clone)]
pub struct DbConfig {
    /// URL `postgres://...` o conninfo `host=... dbname=...`.
    pub url: String,
    /// Tabla destino de las filas aplanadas (identificador validado).
    pub table: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

// El conninfo lleva la contraseña: no se imprime.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
         .field("url", &"<redacted>")
         .field("table", &self.table)
         .field("min_connections", &self.min_connections)
         .field("max_connections", &self.max_connections)
         .finish()
    }
}

impl DbConfig {
    pub fn from_env() -> Result<Self, PersistenceError> {
        init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, PersistenceError>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).ok_or_else(|| PersistenceError::Config(format!("{key} is not set")));

        let url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = required("PG_HOST")?;
                let port = match get("PG_PORT") {
                    Some(raw) => raw.parse::<u16>()
                                    .map_err(|_| PersistenceError::Config(format!("PG_PORT must be a port number, got '{raw}'")))?,
                    None => DEFAULT_PG_PORT,
                };
                let dbname = required("PG_DBNAME")?;
                let user = required("PG_USER")?;
                // La contraseña no se recorta: puede contener espacios.
                let password = lookup("PG_PASSWORD").filter(|v| !v.is_empty());
                connection_string(&host, port, &dbname, &user, password.as_deref())
            }
        };
        let table = get("PG_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_owned());
        validate_identifier(&table)?;
        let min_connections = get("DATABASE_MIN_CONNECTIONS").and_then(|v| v.parse().ok()).unwrap_or(1);
        let max_connections = get("DATABASE_MAX_CONNECTIONS").and_then(|v| v.parse().ok()).unwrap_or(2);
        Ok(Self { url,
                  table,
                  min_connections,
                  max_connections })
    }
}

/// Conninfo de libpq en formato `clave='valor'`.
pub fn connection_string(host: &str, port: u16, dbname: &str, user: &str, password: Option<&str>) -> String {
    let mut parts = vec![format!("host={}", quote_conninfo(host)),
                         format!("port={port}"),
                         format!("dbname={}", quote_conninfo(dbname)),
                         format!("user={}", quote_conninfo(user))];
    if let Some(pw) = password {
        parts.push(format!("password={}", quote_conninfo(pw)));
    }
    parts.join(" ")
}

fn quote_conninfo(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// El nombre de tabla se interpola en DDL/DML: sólo identificadores simples
/// sin comillas (`[A-Za-z_][A-Za-z0-9_]*`, máx. 63 bytes).
pub fn validate_identifier(name: &str) -> Result<(), PersistenceError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            && name.len() <= 63
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::Config(format!("invalid table name '{name}'")))
    }
}
