//! Árbol de campos de una issue y helpers para construir path keys.

use serde_json::{Map, Value};

/// Campos de una issue tal como los devuelve la API: nombre -> valor anidado.
/// El orden de iteración es el del JSON recibido (`preserve_order`).
pub type FieldTree = Map<String, Value>;

/// Separador entre segmentos de un path key.
pub const PATH_SEPARATOR: char = '_';

/// Extiende `prefix` con `segment`; con prefijo vacío devuelve el segmento.
pub fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{segment}")
    }
}

/// Todo lo que sigue al último separador (o el path completo si no hay).
pub fn last_segment(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_with_and_without_prefix() {
        assert_eq!(join_path("", "Summary"), "Summary");
        assert_eq!(join_path("a", "b"), "a_b");
        assert_eq!(join_path("tags", "0"), "tags_0");
    }

    #[test]
    fn last_segment_splits_on_last_separator() {
        assert_eq!(last_segment("a_b_c"), "c");
        assert_eq!(last_segment("summary"), "summary");
        assert_eq!(last_segment(""), "");
    }
}
