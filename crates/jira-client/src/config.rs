//! Configuración del cliente a partir de variables de entorno.

use crate::error::FetchError;

pub const ENV_JIRA_URL: &str = "JIRA_URL";
pub const ENV_JIRA_USERNAME: &str = "JIRA_USERNAME";
pub const ENV_JIRA_TOKEN: &str = "JIRA_TOKEN";
pub const ENV_JIRA_TIMEOUT_SECS: &str = "JIRA_TIMEOUT_SECS";
pub const DEFAULT_JIRA_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Base del servidor, p.ej. `https://example.atlassian.net`.
    pub base_url: String,
    pub username: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

impl JiraConfig {
    /// Lee la sección del tracker con un lookup arbitrario (entorno o tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FetchError>
        where F: Fn(&str) -> Option<String>
    {
        let required = |key: &str| {
            lookup(key).map(|v| v.trim().to_owned())
                       .filter(|v| !v.is_empty())
                       .ok_or_else(|| FetchError::Configuration(format!("{key} is not set")))
        };
        let base_url = required(ENV_JIRA_URL)?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FetchError::Configuration(format!("{ENV_JIRA_URL} must be an http(s) URL, got '{base_url}'")));
        }
        let username = required(ENV_JIRA_USERNAME)?;
        let api_token = required(ENV_JIRA_TOKEN)?;
        let timeout_raw = lookup(ENV_JIRA_TIMEOUT_SECS).map(|v| v.trim().to_owned())
                                                       .filter(|v| !v.is_empty());
        let timeout_secs = match timeout_raw {
            None => DEFAULT_JIRA_TIMEOUT_SECS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(v) if v > 0 => v,
                _ => {
                    return Err(FetchError::Configuration(format!("{ENV_JIRA_TIMEOUT_SECS} must be a positive integer")))
                }
            },
        };
        Ok(Self { base_url,
                  username,
                  api_token,
                  timeout_secs })
    }
}
