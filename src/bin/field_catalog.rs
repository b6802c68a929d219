//! `field-catalog`: reemplaza la tabla `jira_fields` con las definiciones de
//! campos del tracker (id, nombre y tipo Postgres equivalente). Con
//! `DYNAMIC_TABLE` definida, además recrea esa tabla con una columna por campo.
use std::process::ExitCode;

use jira_client::JiraClient;
use jira_persistence::{build_pool, PgCatalogStore, PoolProvider};
use jiraflow_rust::{logging, sync_field_catalog, AppConfig, AppError};
use log::error;

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("field-catalog: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), AppError> {
    let cfg = AppConfig::from_env()?;
    let client = JiraClient::new(cfg.jira.clone())?;
    let pool = build_pool(&cfg.database.url, cfg.database.min_connections, cfg.database.max_connections)?;
    let store = PgCatalogStore::new(PoolProvider { pool });

    let written = sync_field_catalog(&client, &store)?;
    println!("{written} definiciones de campos guardadas en jira_fields");

    if let Some(table) = &cfg.run.dynamic_table {
        let columns = store.create_dynamic_table(table)?;
        if columns == 0 {
            println!("jira_fields está vacía; {table} no se creó");
        } else {
            println!("Tabla {table} creada con {columns} columnas");
        }
    }
    Ok(())
}
