//! jira-domain
//!
//! Modelo puro del aplanado de campos de una issue: árbol de campos, paths,
//! normalización de nombres, contador de colisiones y los traits que separan
//! el recorrido de la fuente (API) y del destino (tabla).
//!
//! Módulos:
//! - `field_tree`: alias del árbol y helpers de path.
//! - `normalize`: transformación fija de nombres (`mss_` + minúsculas).
//! - `flatten`: recorrido recursivo y reintento ante colisiones.
//! - `collision`: política y contador de sufijos.
//! - `source` / `store`: contratos de fetch y de persistencia.
//! - `memory`: implementaciones en memoria para tests y prototipos.
//! - `catalog`: definiciones de campos del tracker y su tipo Postgres.

pub mod catalog;
pub mod collision;
pub mod error;
pub mod field_tree;
pub mod flatten;
pub mod memory;
pub mod normalize;
pub mod row;
pub mod source;
pub mod store;

pub use catalog::{map_jira_type_to_pg, CatalogRow, FieldDefinition};
pub use collision::{CollisionCounter, CollisionPolicy};
pub use error::DomainError;
pub use field_tree::FieldTree;
pub use flatten::{FlattenReport, Flattener};
pub use memory::{InMemoryFieldStore, InMemoryIssueSource};
pub use normalize::{normalize_field_name, FieldNameNormalizer, DEFAULT_FIELD_PREFIX};
pub use row::FieldRow;
pub use source::IssueSource;
pub use store::{FieldSink, FieldStore, InsertOutcome};
