//! Implementaciones Postgres (Diesel) de los traits del dominio.
//!
//! - `PgFieldStore`: tabla de tres columnas (`field_id` PK, `field_name`,
//!   `field_value` JSONB). La recreación es un único batch DDL; la escritura
//!   de un árbol usa UNA conexión y UNA transacción para todo el recorrido,
//!   con un savepoint por insert para que una colisión de PK no aborte la
//!   transacción. Cualquier error hace rollback completo.
//! - `PgCatalogStore`: reemplazo transaccional de la tabla `jira_fields`.
//! - Reintento con backoff corto para errores transitorios de checkout/DDL.

use std::collections::{HashMap, HashSet};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Jsonb, Nullable, Text};
use jira_domain::{CatalogRow, FieldDefinition, FieldRow, FieldSink, FieldStore, FieldTree, FlattenReport, Flattener,
                  InsertOutcome};
use log::{debug, info, warn};
use serde_json::Value;

use crate::config::validate_identifier;
use crate::error::PersistenceError;
use crate::schema::jira_fields;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real o, en tests, uno compartido entre casos.
pub trait ConnectionProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}
impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos mensajes llegan como Unknown con texto.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry simple con backoff lineal muy pequeño (hasta 3 reintentos: 15ms,
/// 30ms, 45ms). Sólo repite la unidad de trabajo provista por `f`.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

fn recreate_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table}; \
             CREATE TABLE {table} (field_id TEXT PRIMARY KEY, field_name TEXT, field_value JSONB);")
}

fn insert_row_sql(table: &str) -> String {
    format!("INSERT INTO {table} (field_id, field_name, field_value) VALUES ($1, $2, $3)")
}

const RECREATE_CATALOG_SQL: &str = "DROP TABLE IF EXISTS jira_fields; \
                                    CREATE TABLE jira_fields (field_id VARCHAR PRIMARY KEY, \
                                    field_name VARCHAR NOT NULL, field_type VARCHAR NOT NULL);";

/// Fila leída de la tabla destino.
#[derive(QueryableByName, Debug)]
struct StoredRow {
    #[diesel(sql_type = Text)]
    field_id: String,
    #[diesel(sql_type = Nullable<Text>)]
    field_name: Option<String>,
    #[diesel(sql_type = Nullable<Jsonb>)]
    field_value: Option<Value>,
}

#[derive(QueryableByName, Debug)]
struct RowCount {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

/// Sink atado a una transacción abierta: cada insert corre en su savepoint.
struct PgTxSink<'a> {
    conn: &'a mut PgConnection,
    insert_sql: &'a str,
}

impl FieldSink for PgTxSink<'_> {
    type Error = PersistenceError;

    fn insert_row(&mut self, row: &FieldRow) -> Result<InsertOutcome, PersistenceError> {
        let sql = self.insert_sql;
        let result = self.conn.transaction::<_, DieselError, _>(|sp| {
                                  diesel::sql_query(sql).bind::<Text, _>(row.field_id.clone())
                                                        .bind::<Text, _>(row.field_name.clone())
                                                        .bind::<Jsonb, _>(row.field_value.clone())
                                                        .execute(sp)
                              });
        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                debug!("insert_row:duplicate field_id={}", row.field_id);
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Tabla destino en Postgres.
pub struct PgFieldStore<P: ConnectionProvider> {
    pub provider: P,
    table: String,
}

impl<P: ConnectionProvider> PgFieldStore<P> {
    /// Falla si `table` no es un identificador simple.
    pub fn new(provider: P, table: impl Into<String>) -> Result<Self, PersistenceError> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self { provider, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Filas actuales ordenadas por `field_id` (orden de bytes).
    pub fn load_rows(&self) -> Result<Vec<FieldRow>, PersistenceError> {
        let sql = format!("SELECT field_id, field_name, field_value FROM {} ORDER BY field_id COLLATE \"C\"", self.table);
        let rows: Vec<StoredRow> = with_retry(|| {
                                       let mut conn = self.provider.connection()?;
                                       diesel::sql_query(sql.as_str()).load(&mut conn)
                                                                       .map_err(PersistenceError::from)
                                   })?;
        Ok(rows.into_iter()
               .map(|r| FieldRow::new(r.field_id, r.field_name.unwrap_or_default(), r.field_value.unwrap_or(Value::Null)))
               .collect())
    }

    pub fn count_rows(&self) -> Result<i64, PersistenceError> {
        let sql = format!("SELECT COUNT(*) AS n FROM {}", self.table);
        let count: RowCount = with_retry(|| {
                                  let mut conn = self.provider.connection()?;
                                  diesel::sql_query(sql.as_str()).get_result(&mut conn)
                                                                  .map_err(PersistenceError::from)
                              })?;
        Ok(count.n)
    }
}

impl<P: ConnectionProvider> FieldStore for PgFieldStore<P> {
    type Error = PersistenceError;

    fn recreate_table(&mut self) -> Result<(), PersistenceError> {
        let ddl = recreate_table_sql(&self.table);
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.batch_execute(&ddl).map_err(PersistenceError::from)
        })?;
        info!("recreate_table:done table={}", self.table);
        Ok(())
    }

    fn write_tree(&mut self, tree: &FieldTree, flattener: &Flattener) -> Result<FlattenReport, PersistenceError> {
        debug!("write_tree:start table={} top_level_fields={}", self.table, tree.len());
        let insert_sql = insert_row_sql(&self.table);
        let mut conn = with_retry(|| self.provider.connection())?;
        let report = conn.build_transaction()
                         .read_write()
                         .run(|tx| {
                             let mut sink = PgTxSink { conn: tx,
                                                       insert_sql: &insert_sql };
                             flattener.write_tree(tree, &mut sink)
                         })?;
        info!("write_tree:done table={} rows={} collisions={}",
              self.table,
              report.rows_inserted,
              report.collisions_resolved);
        Ok(report)
    }
}

/// Fila para insertar en `jira_fields`.
#[derive(Insertable, Debug)]
#[diesel(table_name = jira_fields)]
pub struct NewCatalogRow<'a> {
    pub field_id: &'a str,
    pub field_name: &'a str,
    pub field_type: &'a str,
}

impl<'a> From<&'a CatalogRow> for NewCatalogRow<'a> {
    fn from(row: &'a CatalogRow) -> Self {
        Self { field_id: &row.field_id,
               field_name: &row.field_name,
               field_type: &row.field_type }
    }
}

/// Catálogo de campos del tracker (`jira_fields`).
pub struct PgCatalogStore<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgCatalogStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Recrea `jira_fields` e inserta las definiciones en una transacción.
    /// Ids repetidos se ignoran; devuelve las filas insertadas.
    pub fn replace_catalog(&self, defs: &[FieldDefinition]) -> Result<usize, PersistenceError> {
        let rows: Vec<CatalogRow> = defs.iter().map(CatalogRow::from).collect();
        let new_rows: Vec<NewCatalogRow> = rows.iter().map(NewCatalogRow::from).collect();
        let mut conn = with_retry(|| self.provider.connection())?;
        let inserted = conn.build_transaction()
                           .read_write()
                           .run(|tx| {
                               tx.batch_execute(RECREATE_CATALOG_SQL)?;
                               if new_rows.is_empty() {
                                   return Ok(0);
                               }
                               diesel::insert_into(jira_fields::table).values(&new_rows)
                                                                      .on_conflict_do_nothing()
                                                                      .execute(tx)
                           })
                           .map_err(PersistenceError::from)?;
        info!("replace_catalog:done definitions={} inserted={inserted}", defs.len());
        Ok(inserted)
    }

    /// Recrea `table` con una columna por campo del catálogo (`field_name`
    /// con el `field_type` guardado). Sin catálogo no toca nada y devuelve 0.
    pub fn create_dynamic_table(&self, table: &str) -> Result<usize, PersistenceError> {
        validate_identifier(table)?;
        let mut conn = with_retry(|| self.provider.connection())?;
        let fields: Vec<(String, String)> = jira_fields::table.select((jira_fields::field_name, jira_fields::field_type))
                                                              .order(jira_fields::field_id.asc())
                                                              .load(&mut conn)?;
        if fields.is_empty() {
            warn!("create_dynamic_table: jira_fields is empty, {table} not created");
            return Ok(0);
        }
        let ddl = dynamic_table_sql(table, &fields)?;
        conn.build_transaction()
            .read_write()
            .run(|tx| tx.batch_execute(&ddl))
            .map_err(PersistenceError::from)?;
        info!("create_dynamic_table:done table={table} columns={}", fields.len());
        Ok(fields.len())
    }

    pub fn load_catalog(&self) -> Result<Vec<CatalogRow>, PersistenceError> {
        let mut conn = self.provider.connection()?;
        let rows: Vec<(String, String, String)> = jira_fields::table.order(jira_fields::field_id.asc())
                                                                    .load(&mut conn)?;
        Ok(rows.into_iter()
               .map(|(field_id, field_name, field_type)| CatalogRow { field_id,
                                                                      field_name,
                                                                      field_type })
               .collect())
    }
}

/// Columnas `"nombre" tipo` de la tabla ancha. Un nombre repetido recibe
/// `_1`, `_2`, ... (la primera aparición queda sin sufijo).
fn dynamic_column_defs(fields: &[(String, String)]) -> Result<Vec<String>, PersistenceError> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut repeats: HashMap<&str, u32> = HashMap::new();
    let mut defs = Vec::with_capacity(fields.len());
    for (name, field_type) in fields {
        validate_column_type(field_type)?;
        let mut column = name.clone();
        if taken.contains(&column) {
            let n = repeats.entry(name.as_str()).or_insert(0);
            loop {
                *n += 1;
                let candidate = format!("{name}_{n}");
                if !taken.contains(&candidate) {
                    column = candidate;
                    break;
                }
            }
        }
        defs.push(format!("{} {field_type}", quote_identifier(&column)));
        taken.insert(column);
    }
    Ok(defs)
}

fn dynamic_table_sql(table: &str, fields: &[(String, String)]) -> Result<String, PersistenceError> {
    let columns = dynamic_column_defs(fields)?;
    Ok(format!("DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({});", columns.join(", ")))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// El tipo va sin comillas en el DDL.
fn validate_column_type(field_type: &str) -> Result<(), PersistenceError> {
    let valid = !field_type.trim().is_empty()
                && field_type.chars()
                             .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '[' | ']' | '(' | ')' | ','));
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::Config(format!("invalid column type '{field_type}'")))
    }
}

/// Construye un pool Postgres r2d2 a partir de URL o conninfo.
///
/// - Ajusta tamaños inválidos (0 -> 1; `min > max` -> `min = max`).
/// - Devuelve `PersistenceError::TransientIo` ante errores del pool/manager.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1);
    if validated_min > validated_max {
        warn!("min_size > max_size ({validated_min} > {validated_max}), ajustando min=max");
    }
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    r2d2::Pool::builder().min_idle(Some(validated_min.min(validated_max)))
                         .max_size(validated_max)
                         .build(manager)
                         .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))
}
