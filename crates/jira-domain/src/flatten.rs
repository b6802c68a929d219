//! Recorrido recursivo del árbol de campos.
//!
//! Cada hoja produce una fila `(path, normalize(last_segment(path)), valor)`:
//! - mapa: se desciende con `path_key` (o `key` si el prefijo es vacío);
//! - secuencia: se desciende con `path_i`;
//! - hoja (incluye `null`): se inserta.
//!
//! El nombre sale del último segmento del path, no de la key JSON: una key
//! con `_` (`customfield_10010`) aporta sólo su tramo final (`mss_10010`).
//!
//! Los mapas y secuencias vacíos no producen filas.

use log::{debug, warn};
use serde_json::Value;

use crate::collision::{CollisionCounter, CollisionPolicy};
use crate::error::DomainError;
use crate::field_tree::{join_path, last_segment, FieldTree};
use crate::normalize::FieldNameNormalizer;
use crate::row::FieldRow;
use crate::store::{FieldSink, InsertOutcome};

/// Tope de sufijos probados por hoja con la política `Suffix`.
pub const MAX_SUFFIX_ATTEMPTS: u32 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenReport {
    pub rows_inserted: usize,
    pub collisions_resolved: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Flattener {
    normalizer: FieldNameNormalizer,
    policy: CollisionPolicy,
}

impl Flattener {
    pub fn new(normalizer: FieldNameNormalizer, policy: CollisionPolicy) -> Self {
        Self { normalizer, policy }
    }

    pub fn normalizer(&self) -> &FieldNameNormalizer {
        &self.normalizer
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Filas de todas las hojas en orden de recorrido, sin resolver colisiones.
    pub fn flatten_rows(&self, tree: &FieldTree) -> Vec<FieldRow> {
        let mut rows = Vec::new();
        let Ok(()) = walk_map::<std::convert::Infallible, _>(tree, "", &mut |path, leaf| {
            rows.push(self.leaf_row(path, leaf));
            Ok(())
        });
        rows
    }

    /// Inserta un árbol completo con un contador nuevo para este recorrido.
    pub fn write_tree<S: FieldSink>(&self, tree: &FieldTree, sink: &mut S) -> Result<FlattenReport, S::Error> {
        let mut counter = CollisionCounter::new();
        let mut report = FlattenReport::default();
        walk_map(tree, "", &mut |path, leaf| {
            let row = self.leaf_row(path, leaf);
            self.insert_leaf(row, &mut counter, sink, &mut report)
        })?;
        debug!("write_tree:done rows={} collisions={}",
               report.rows_inserted,
               report.collisions_resolved);
        Ok(report)
    }

    /// Aplana `value` bajo `path_prefix` e inserta cada hoja en `sink`.
    ///
    /// El `counter` se comparte entre llamadas hermanas: quien recorre varios
    /// subárboles debe pasar el mismo contador a todas.
    pub fn flatten_and_insert<S: FieldSink>(&self,
                                            value: &Value,
                                            path_prefix: &str,
                                            counter: &mut CollisionCounter,
                                            sink: &mut S)
                                            -> Result<FlattenReport, S::Error> {
        let mut report = FlattenReport::default();
        walk(value, path_prefix, &mut |path, leaf| {
            let row = self.leaf_row(path, leaf);
            self.insert_leaf(row, counter, sink, &mut report)
        })?;
        Ok(report)
    }

    fn leaf_row(&self, path: &str, leaf: &Value) -> FieldRow {
        FieldRow::new(path, self.normalizer.normalize(last_segment(path)), leaf.clone())
    }

    fn insert_leaf<S: FieldSink>(&self,
                                 row: FieldRow,
                                 counter: &mut CollisionCounter,
                                 sink: &mut S,
                                 report: &mut FlattenReport)
                                 -> Result<(), S::Error> {
        if sink.insert_row(&row)? == InsertOutcome::Inserted {
            report.rows_inserted += 1;
            return Ok(());
        }
        let base = row.field_id.as_str();
        let attempts = match self.policy {
            CollisionPolicy::Suffix => MAX_SUFFIX_ATTEMPTS,
            CollisionPolicy::SingleRetry => 1,
        };
        for _ in 0..attempts {
            let candidate = match self.policy {
                CollisionPolicy::Suffix => counter.next_candidate(base),
                CollisionPolicy::SingleRetry => format!("{base}_0"),
            };
            debug!("collision field_id={base} -> retry as {candidate}");
            if sink.insert_row(&row.with_field_id(candidate))? == InsertOutcome::Inserted {
                report.rows_inserted += 1;
                report.collisions_resolved += 1;
                return Ok(());
            }
        }
        warn!("collision field_id={base} unresolved (policy={})", self.policy);
        Err(DomainError::UnresolvedCollision(base.to_string()).into())
    }
}

fn walk<E, F>(value: &Value, path: &str, on_leaf: &mut F) -> Result<(), E>
    where F: FnMut(&str, &Value) -> Result<(), E>
{
    match value {
        Value::Object(map) => walk_map(map, path, on_leaf),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(item, &join_path(path, &i.to_string()), on_leaf)?;
            }
            Ok(())
        }
        leaf => on_leaf(path, leaf),
    }
}

fn walk_map<E, F>(map: &FieldTree, path: &str, on_leaf: &mut F) -> Result<(), E>
    where F: FnMut(&str, &Value) -> Result<(), E>
{
    for (key, sub) in map {
        walk(sub, &join_path(path, key), on_leaf)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::normalize::normalize_field_name;

    fn tree(v: Value) -> FieldTree {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn scalar_at_top_level() {
        let rows = Flattener::default().flatten_rows(&tree(json!({"Summary": "Fix bug"})));
        assert_eq!(rows, vec![FieldRow::new("Summary", "mss_summary", json!("Fix bug"))]);
    }

    #[test]
    fn nested_mapping_names_come_from_last_segment() {
        let rows = Flattener::default().flatten_rows(&tree(json!({"a": {"b": 1, "c": 2}})));
        let ids: Vec<_> = rows.iter().map(|r| r.field_id.as_str()).collect();
        let names: Vec<_> = rows.iter().map(|r| r.field_name.as_str()).collect();
        assert_eq!(ids, ["a_b", "a_c"]);
        assert_eq!(names, ["mss_b", "mss_c"]);
    }

    #[test]
    fn sequence_indices_become_segments() {
        let rows = Flattener::default().flatten_rows(&tree(json!({"tags": ["x", "y"]})));
        assert_eq!(rows,
                   vec![FieldRow::new("tags_0", "mss_0", json!("x")),
                        FieldRow::new("tags_1", "mss_1", json!("y"))]);
    }

    #[test]
    fn null_is_a_leaf_and_empty_containers_vanish() {
        let rows = Flattener::default().flatten_rows(&tree(json!({"due": null, "labels": [], "meta": {}})));
        assert_eq!(rows, vec![FieldRow::new("due", "mss_due", Value::Null)]);
    }

    #[test]
    fn keeps_api_order() {
        let t: FieldTree = serde_json::from_str(r#"{"z": 1, "a": 2, "m": {"y": 3, "b": 4}}"#).unwrap();
        let ids: Vec<_> = Flattener::default().flatten_rows(&t).into_iter().map(|r| r.field_id).collect();
        assert_eq!(ids, ["z", "a", "m_y", "m_b"]);
    }

    #[test]
    fn deep_mixed_structure() {
        let t = tree(json!({"Fix Versions": [{"name": "1.0", "archived": false}]}));
        let rows = Flattener::default().flatten_rows(&t);
        assert_eq!(rows,
                   vec![FieldRow::new("Fix Versions_0_name", "mss_name", json!("1.0")),
                        FieldRow::new("Fix Versions_0_archived", "mss_archived", json!(false))]);
    }

    #[test]
    fn underscored_keys_contribute_only_their_last_segment() {
        let t = tree(json!({"customfield_10010": "S1", "Fix Versions": [{"self_link": "u"}]}));
        let rows = Flattener::default().flatten_rows(&t);
        assert_eq!(rows,
                   vec![FieldRow::new("customfield_10010", "mss_10010", json!("S1")),
                        FieldRow::new("Fix Versions_0_self_link", "mss_link", json!("u"))]);
        for row in &rows {
            assert_eq!(row.field_name, normalize_field_name(last_segment(&row.field_id)));
        }
    }
}
