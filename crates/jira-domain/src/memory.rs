//! Backends en memoria (tests y prototipos).

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::catalog::FieldDefinition;
use crate::error::DomainError;
use crate::field_tree::FieldTree;
use crate::flatten::{FlattenReport, Flattener};
use crate::row::FieldRow;
use crate::source::IssueSource;
use crate::store::{FieldSink, FieldStore, InsertOutcome};

/// Tabla destino en memoria, con PK sobre `field_id` y orden de inserción.
/// `None` equivale a "la tabla no existe".
#[derive(Debug, Default)]
pub struct InMemoryFieldStore {
    rows: Option<IndexMap<String, FieldRow>>,
    recreate_calls: usize,
}

impl InMemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_exists(&self) -> bool {
        self.rows.is_some()
    }

    pub fn recreate_calls(&self) -> usize {
        self.recreate_calls
    }

    pub fn rows(&self) -> Vec<&FieldRow> {
        self.rows.as_ref().map(|r| r.values().collect()).unwrap_or_default()
    }

    pub fn get(&self, field_id: &str) -> Option<&FieldRow> {
        self.rows.as_ref().and_then(|r| r.get(field_id))
    }

    pub fn len(&self) -> usize {
        self.rows.as_ref().map_or(0, IndexMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FieldSink for InMemoryFieldStore {
    type Error = DomainError;

    fn insert_row(&mut self, row: &FieldRow) -> Result<InsertOutcome, DomainError> {
        let rows = self.rows
                       .as_mut()
                       .ok_or_else(|| DomainError::NotFound("destination table".into()))?;
        if rows.contains_key(&row.field_id) {
            return Ok(InsertOutcome::Duplicate);
        }
        rows.insert(row.field_id.clone(), row.clone());
        Ok(InsertOutcome::Inserted)
    }
}

impl FieldStore for InMemoryFieldStore {
    type Error = DomainError;

    fn recreate_table(&mut self) -> Result<(), DomainError> {
        self.rows = Some(IndexMap::new());
        self.recreate_calls += 1;
        Ok(())
    }

    fn write_tree(&mut self, tree: &FieldTree, flattener: &Flattener) -> Result<FlattenReport, DomainError> {
        // Rollback manual: se restaura la foto previa si el recorrido falla.
        let snapshot = self.rows.clone();
        flattener.write_tree(tree, self).inspect_err(|_| self.rows = snapshot)
    }
}

/// Fuente de issues fija, indexada por key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIssueSource {
    issues: HashMap<String, FieldTree>,
    catalog: Vec<FieldDefinition>,
}

impl InMemoryIssueSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(mut self, issue_key: impl Into<String>, fields: FieldTree) -> Self {
        self.issues.insert(issue_key.into(), fields);
        self
    }

    pub fn with_catalog(mut self, catalog: Vec<FieldDefinition>) -> Self {
        self.catalog = catalog;
        self
    }
}

impl IssueSource for InMemoryIssueSource {
    type Error = DomainError;

    fn fetch_issue_fields(&self, issue_key: &str) -> Result<FieldTree, DomainError> {
        self.issues
            .get(issue_key)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("issue {issue_key}")))
    }

    fn fetch_field_catalog(&self) -> Result<Vec<FieldDefinition>, DomainError> {
        Ok(self.catalog.clone())
    }
}
