//! Implementación HTTP (reqwest bloqueante) de `IssueSource`.

use std::time::Duration;

use jira_domain::{FieldDefinition, FieldTree, IssueSource};
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header;
use serde_json::Value;

use crate::config::JiraConfig;
use crate::error::FetchError;

const ISSUE_PATH: &str = "rest/api/2/issue";
const FIELD_PATH: &str = "rest/api/2/field";

/// Cliente autenticado con basic auth (usuario + API token).
pub struct JiraClient {
    config: JiraConfig,
    client: Client,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs))
                                      .default_headers(headers)
                                      .build()
                                      .map_err(|e| FetchError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    fn get_json(&self, path: &str, issue_key: Option<&str>) -> Result<Value, FetchError> {
        let url = endpoint(&self.config.base_url, path);
        debug!("GET {url}");
        let response = self.client
                           .get(&url)
                           .basic_auth(&self.config.username, Some(&self.config.api_token))
                           .send()
                           .map_err(|e| FetchError::Transport { url: url.clone(),
                                                                message: e.to_string() })?;
        let status = response.status();
        let body = response.text()
                           .map_err(|e| FetchError::Transport { url: url.clone(),
                                                                message: format!("reading body: {e}") })?;
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16(), &body, issue_key));
        }
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl IssueSource for JiraClient {
    type Error = FetchError;

    fn fetch_issue_fields(&self, issue_key: &str) -> Result<FieldTree, FetchError> {
        validate_issue_key(issue_key)?;
        let payload = self.get_json(&format!("{ISSUE_PATH}/{issue_key}"), Some(issue_key))?;
        let fields = extract_fields(payload)?;
        info!("fetched issue={issue_key} top_level_fields={}", fields.len());
        Ok(fields)
    }

    fn fetch_field_catalog(&self) -> Result<Vec<FieldDefinition>, FetchError> {
        let payload = self.get_json(FIELD_PATH, None)?;
        let defs: Vec<FieldDefinition> =
            serde_json::from_value(payload).map_err(|e| FetchError::Decode(format!("field catalog: {e}")))?;
        info!("fetched field catalog definitions={}", defs.len());
        Ok(defs)
    }
}

/// Une base y path con exactamente una `/` entre ambos.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Las keys van directo al path de la URL: sólo ASCII alfanumérico, `-` y `_`.
pub fn validate_issue_key(issue_key: &str) -> Result<(), FetchError> {
    let valid = !issue_key.is_empty()
                && issue_key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(FetchError::Configuration(format!("invalid issue key '{issue_key}'")))
    }
}

/// Extrae el objeto `fields` de la respuesta de `GET /issue/{key}`.
pub fn extract_fields(payload: Value) -> Result<FieldTree, FetchError> {
    let Value::Object(mut issue) = payload else {
        return Err(FetchError::Decode("issue response is not a JSON object".into()));
    };
    match issue.remove("fields") {
        Some(Value::Object(fields)) => Ok(fields),
        Some(_) => Err(FetchError::Decode("`fields` is not a JSON object".into())),
        None => Err(FetchError::Decode("issue response has no `fields`".into())),
    }
}
