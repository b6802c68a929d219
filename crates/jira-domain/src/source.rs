//! Contrato de la fuente de issues (API del tracker).

use log::error;

use crate::catalog::FieldDefinition;
use crate::field_tree::FieldTree;

pub trait IssueSource {
    type Error: std::fmt::Display;

    /// Campos de la issue, sin transformar.
    fn fetch_issue_fields(&self, issue_key: &str) -> Result<FieldTree, Self::Error>;

    /// Definiciones de todos los campos conocidos por el tracker.
    fn fetch_field_catalog(&self) -> Result<Vec<FieldDefinition>, Self::Error>;

    /// Variante que colapsa cualquier fallo en un mapa vacío (solo lo registra).
    /// No distingue "sin campos" de "fetch fallido".
    fn fetch_fields_or_empty(&self, issue_key: &str) -> FieldTree {
        match self.fetch_issue_fields(issue_key) {
            Ok(tree) => tree,
            Err(e) => {
                error!("fetch issue={issue_key} failed: {e}");
                FieldTree::new()
            }
        }
    }
}
