//! Catálogo de campos del tracker (`GET /rest/api/2/field`).

use serde::{Deserialize, Serialize};

/// Tipo usado cuando la definición no trae `schema.type`.
pub const UNKNOWN_FIELD_TYPE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
}

/// Definición de un campo tal como la publica la API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub schema: Option<FieldSchema>,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: Option<&str>) -> Self {
        Self { id: id.into(),
               name: name.into(),
               schema: field_type.map(|t| FieldSchema { field_type: Some(t.to_string()) }) }
    }

    pub fn jira_type(&self) -> &str {
        self.schema
            .as_ref()
            .and_then(|s| s.field_type.as_deref())
            .unwrap_or(UNKNOWN_FIELD_TYPE)
    }
}

/// Tipo Postgres para un tipo de campo Jira. Los tipos complejos van a JSONB;
/// lo desconocido cae en TEXT.
pub fn map_jira_type_to_pg(jira_type: &str) -> &'static str {
    match jira_type {
        "string" => "VARCHAR",
        "number" => "NUMERIC",
        "array" => "TEXT[]",
        "date" => "DATE",
        "datetime" => "TIMESTAMP",
        "user" | "option" | "any" => "JSONB",
        _ => "TEXT",
    }
}

/// Fila de la tabla `jira_fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub field_id: String,
    pub field_name: String,
    pub field_type: String,
}

impl From<&FieldDefinition> for CatalogRow {
    fn from(def: &FieldDefinition) -> Self {
        Self { field_id: def.id.clone(),
               field_name: def.name.clone(),
               field_type: map_jira_type_to_pg(def.jira_type()).to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mapping() {
        assert_eq!(map_jira_type_to_pg("string"), "VARCHAR");
        assert_eq!(map_jira_type_to_pg("array"), "TEXT[]");
        assert_eq!(map_jira_type_to_pg("option"), "JSONB");
        assert_eq!(map_jira_type_to_pg(UNKNOWN_FIELD_TYPE), "TEXT");
        assert_eq!(map_jira_type_to_pg("sd-servicelevelagreement"), "TEXT");
    }

    #[test]
    fn parses_api_payload_with_and_without_schema() {
        let raw = r#"[
            {"id": "summary", "name": "Summary", "custom": false,
             "schema": {"type": "string", "system": "summary"}},
            {"id": "issuekey", "name": "Key"},
            {"id": "customfield_10010", "name": "Sprint",
             "schema": {"type": "array", "items": "json", "customId": 10010}}
        ]"#;
        let defs: Vec<FieldDefinition> = serde_json::from_str(raw).unwrap();
        let rows: Vec<CatalogRow> = defs.iter().map(CatalogRow::from).collect();
        assert_eq!(rows[0].field_type, "VARCHAR");
        assert_eq!(defs[1].jira_type(), "unknown");
        assert_eq!(rows[1].field_type, "TEXT");
        assert_eq!(rows[2], CatalogRow { field_id: "customfield_10010".into(),
                                         field_name: "Sprint".into(),
                                         field_type: "TEXT[]".into() });
    }
}
