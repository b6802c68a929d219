//! Transformación fija de nombres de campo.

/// Prefijo por defecto aplicado a cada `field_name`.
pub const DEFAULT_FIELD_PREFIX: &str = "mss_";

/// Normaliza nombres: minúsculas, espacios -> `_` y prefijo fijo.
/// Función pura y total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNameNormalizer {
    prefix: String,
}

impl FieldNameNormalizer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn normalize(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        let mut out = String::with_capacity(self.prefix.len() + lowered.len());
        out.push_str(&self.prefix);
        out.extend(lowered.chars().map(|c| if c == ' ' { '_' } else { c }));
        out
    }
}

impl Default for FieldNameNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD_PREFIX)
    }
}

/// Atajo con el prefijo por defecto.
pub fn normalize_field_name(name: &str) -> String {
    FieldNameNormalizer::default().normalize(name)
}
