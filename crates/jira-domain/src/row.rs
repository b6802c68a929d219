use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fila destino: una por cada hoja del árbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRow {
    /// Path key (o su variante con sufijo tras una colisión).
    pub field_id: String,
    /// Nombre normalizado del segmento inmediato, no del path completo.
    pub field_name: String,
    /// Valor hoja tal cual; se guarda como JSONB.
    pub field_value: Value,
}

impl FieldRow {
    pub fn new(field_id: impl Into<String>, field_name: impl Into<String>, field_value: Value) -> Self {
        Self { field_id: field_id.into(),
               field_name: field_name.into(),
               field_value }
    }

    /// Copia de la fila con otro `field_id` (mismo nombre y valor).
    pub fn with_field_id(&self, field_id: impl Into<String>) -> Self {
        Self { field_id: field_id.into(),
               field_name: self.field_name.clone(),
               field_value: self.field_value.clone() }
    }
}
