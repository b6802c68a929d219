//! Contratos de persistencia de filas.

use crate::error::DomainError;
use crate::field_tree::FieldTree;
use crate::flatten::{FlattenReport, Flattener};
use crate::row::FieldRow;

/// Resultado de un insert individual. Una colisión de PK no es un error: el
/// flattener decide si reintenta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

/// Destino fila a fila usado durante el recorrido.
pub trait FieldSink {
    type Error: From<DomainError>;

    fn insert_row(&mut self, row: &FieldRow) -> Result<InsertOutcome, Self::Error>;
}

/// Tabla destino completa: recreación y escritura de un árbol entero como una
/// unidad (todo o nada).
pub trait FieldStore {
    type Error;

    /// `DROP TABLE IF EXISTS` + `CREATE TABLE` con el esquema de tres columnas.
    fn recreate_table(&mut self) -> Result<(), Self::Error>;

    /// Aplana e inserta `tree`. Si falla, no queda ninguna fila del árbol.
    fn write_tree(&mut self, tree: &FieldTree, flattener: &Flattener) -> Result<FlattenReport, Self::Error>;
}
