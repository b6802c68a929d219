//! Orquestación de una corrida.
//!
//! `migrate_issue`: fetch de la issue -> recreación de la tabla -> escritura
//! del árbol aplanado. Cada fase sólo corre si la anterior terminó bien; un
//! fetch fallido no toca la tabla y un mapa vacío tampoco.
//!
//! `sync_field_catalog`: fetch del catálogo de campos -> reemplazo de la tabla
//! `jira_fields`.

use std::fmt::{Debug, Display};

use jira_domain::{map_jira_type_to_pg, FieldStore, FlattenReport, Flattener, IssueSource};
use jira_persistence::{ConnectionProvider, PersistenceError, PgCatalogStore};
use log::{debug, error, info, warn};
use thiserror::Error;

/// Fallo de una corrida, etiquetado con la fase en la que ocurrió.
#[derive(Debug, Error)]
pub enum RunError<F, S>
    where F: Display + Debug,
          S: Display + Debug
{
    #[error("fetch of {target} failed: {error}")]
    Fetch { target: String, error: F },
    #[error("table recreation failed: {0}")]
    CreateTable(S),
    #[error("writing rows failed: {0}")]
    Write(S),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// La issue no tiene campos: la tabla no se tocó.
    NoFields,
    Written(FlattenReport),
}

pub fn migrate_issue<S, W>(source: &S,
                           store: &mut W,
                           issue_key: &str,
                           flattener: &Flattener)
                           -> Result<RunOutcome, RunError<S::Error, W::Error>>
    where S: IssueSource,
          S::Error: Debug,
          W: FieldStore,
          W::Error: Display + Debug
{
    info!("migrate_issue:start issue={issue_key} policy={}", flattener.policy());
    let tree = source.fetch_issue_fields(issue_key).map_err(|e| {
                                                        error!("migrate_issue:fetch_failed issue={issue_key} err={e}");
                                                        RunError::Fetch { target: format!("issue {issue_key}"),
                                                                          error: e }
                                                    })?;
    if tree.is_empty() {
        warn!("migrate_issue:no_fields issue={issue_key}; destination table left untouched");
        return Ok(RunOutcome::NoFields);
    }
    debug!("migrate_issue:fetched issue={issue_key} top_level_fields={}", tree.len());

    store.recreate_table().map_err(|e| {
                               error!("migrate_issue:recreate_failed err={e}");
                               RunError::CreateTable(e)
                           })?;
    let report = store.write_tree(&tree, flattener).map_err(|e| {
                                                        error!("migrate_issue:write_failed err={e}");
                                                        RunError::Write(e)
                                                    })?;
    info!("migrate_issue:done issue={issue_key} rows={} collisions={}",
          report.rows_inserted,
          report.collisions_resolved);
    Ok(RunOutcome::Written(report))
}

/// Reemplaza la tabla `jira_fields` con el catálogo actual del tracker.
/// Devuelve cuántas definiciones se escribieron.
pub fn sync_field_catalog<S, P>(source: &S,
                                store: &PgCatalogStore<P>)
                                -> Result<usize, RunError<S::Error, PersistenceError>>
    where S: IssueSource,
          S::Error: Debug,
          P: ConnectionProvider
{
    let defs = source.fetch_field_catalog().map_err(|e| {
                                               error!("sync_field_catalog:fetch_failed err={e}");
                                               RunError::Fetch { target: "field catalog".into(),
                                                                 error: e }
                                           })?;
    for def in &defs {
        debug!("field {} ({}) -> {}", def.id, def.jira_type(), map_jira_type_to_pg(def.jira_type()));
    }
    let written = store.replace_catalog(&defs).map_err(|e| {
                                                  error!("sync_field_catalog:write_failed err={e}");
                                                  RunError::Write(e)
                                              })?;
    info!("sync_field_catalog:done definitions={written}");
    Ok(written)
}
