//! `jiraflow`: copia los campos de una issue de Jira, aplanados, a la tabla
//! destino en Postgres. Sin argumentos; todo sale del entorno / `.env`.
//!
//! Códigos de salida: 0 ok (o issue sin campos), 3 configuración, 4 fetch,
//! 5 persistencia.
use std::process::ExitCode;

use jira_client::JiraClient;
use jira_persistence::{build_pool, PgFieldStore, PoolProvider};
use jiraflow_rust::{logging, migrate_issue, AppConfig, AppError, RunOutcome};
use log::error;

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("jiraflow: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), AppError> {
    let cfg = AppConfig::from_env()?;
    let client = JiraClient::new(cfg.jira.clone())?;
    let pool = build_pool(&cfg.database.url, cfg.database.min_connections, cfg.database.max_connections)?;
    let mut store = PgFieldStore::new(PoolProvider { pool }, cfg.database.table.clone())?;

    match migrate_issue(&client, &mut store, &cfg.run.issue_key, &cfg.run.flattener())? {
        RunOutcome::NoFields => {
            println!("Issue {}: sin campos; tabla {} sin cambios", cfg.run.issue_key, store.table());
        }
        RunOutcome::Written(report) => {
            println!("Issue {}: {} filas en {} ({} colisiones resueltas)",
                     cfg.run.issue_key,
                     report.rows_inserted,
                     store.table(),
                     report.collisions_resolved);
        }
    }
    Ok(())
}
