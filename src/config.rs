//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y arma una estructura
//! inmutable (`AppConfig`) que los binarios construyen al inicio y pasan a la
//! orquestación. Nada se lee del entorno después de este punto.
use std::env;

use jira_client::JiraConfig;
use jira_domain::{CollisionPolicy, FieldNameNormalizer, Flattener, DEFAULT_FIELD_PREFIX};
use jira_persistence::config::validate_identifier;
use jira_persistence::{init_dotenv, DbConfig};

use crate::errors::AppError;

pub const ENV_ISSUE_KEY: &str = "JIRA_ISSUE_KEY";
pub const ENV_FIELD_PREFIX: &str = "FIELD_NAME_PREFIX";
pub const ENV_COLLISION_POLICY: &str = "FIELD_COLLISION_POLICY";
pub const ENV_DYNAMIC_TABLE: &str = "DYNAMIC_TABLE";
pub const DEFAULT_ISSUE_KEY: &str = "MSSCI-1";

/// Parámetros de una corrida de migración.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Issue cuyos campos se migran.
    pub issue_key: String,
    /// Prefijo de `field_name`.
    pub field_prefix: String,
    pub collision_policy: CollisionPolicy,
    /// Tabla ancha que `field-catalog` arma a partir del catálogo, si se pide.
    pub dynamic_table: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { issue_key: DEFAULT_ISSUE_KEY.to_string(),
               field_prefix: DEFAULT_FIELD_PREFIX.to_string(),
               collision_policy: CollisionPolicy::default(),
               dynamic_table: None }
    }
}

impl RunConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        let collision_policy = match get(ENV_COLLISION_POLICY) {
            Some(raw) => raw.parse::<CollisionPolicy>()
                            .map_err(|e| AppError::Config(format!("{ENV_COLLISION_POLICY}: {e}")))?,
            None => defaults.collision_policy,
        };
        let dynamic_table = get(ENV_DYNAMIC_TABLE);
        if let Some(table) = &dynamic_table {
            validate_identifier(table)?;
        }
        Ok(Self { issue_key: get(ENV_ISSUE_KEY).unwrap_or(defaults.issue_key),
                  field_prefix: get(ENV_FIELD_PREFIX).unwrap_or(defaults.field_prefix),
                  collision_policy,
                  dynamic_table })
    }

    pub fn flattener(&self) -> Flattener {
        Flattener::new(FieldNameNormalizer::new(self.field_prefix.clone()), self.collision_policy)
    }
}

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Servidor Jira y credenciales.
    pub jira: JiraConfig,
    /// Conexión y tabla destino.
    pub database: DbConfig,
    pub run: RunConfig,
}

impl AppConfig {
    /// Carga `.env` (si existe) y lee todas las secciones del entorno.
    pub fn from_env() -> Result<Self, AppError> {
        init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let jira = JiraConfig::from_lookup(&lookup)?;
        let database = DbConfig::from_lookup(&lookup)?;
        let run = RunConfig::from_lookup(&lookup)?;
        Ok(Self { jira, database, run })
    }
}
