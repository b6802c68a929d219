
use std::sync::Mutex;

use diesel::prelude::*;
use diesel::sql_types::Text;
use jira_domain::{CatalogRow, FieldDefinition};
use jira_persistence::{PersistenceError, PgCatalogStore, PoolProvider};
use test_support::with_pool;

// Ambos tests reescriben `jira_fields`.
static CATALOG_LOCK: Mutex<()> = Mutex::new(());

#[derive(QueryableByName, Debug)]
struct ColumnInfo {
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    data_type: String,
}

#[test]
fn replaces_catalog_with_mapped_types() {
    let Some(pool) = with_pool(|p| p.clone()) else {
        eprintln!("skip (no DATABASE_URL)");
        return;
    };
    let _guard = CATALOG_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let store = PgCatalogStore::new(PoolProvider { pool });
    let defs = vec![FieldDefinition::new("summary", "Summary", Some("string")),
                    FieldDefinition::new("assignee", "Assignee", Some("user")),
                    FieldDefinition::new("issuekey", "Key", None),
                    FieldDefinition::new("summary", "Summary (dup)", Some("string"))];

    assert_eq!(store.replace_catalog(&defs).expect("replace"), 3);
    assert_eq!(store.replace_catalog(&defs[..2]).expect("replace again"), 2);

    let rows = store.load_catalog().expect("load");
    assert_eq!(rows,
               vec![CatalogRow { field_id: "assignee".into(),
                                 field_name: "Assignee".into(),
                                 field_type: "JSONB".into() },
                    CatalogRow { field_id: "summary".into(),
                                 field_name: "Summary".into(),
                                 field_type: "VARCHAR".into() }]);
}

#[test]
fn builds_wide_table_with_one_column_per_field() {
    let Some(pool) = with_pool(|p| p.clone()) else {
        eprintln!("skip (no DATABASE_URL)");
        return;
    };
    let _guard = CATALOG_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let store = PgCatalogStore::new(PoolProvider { pool: pool.clone() });
    let defs = vec![FieldDefinition::new("customfield_10010", "Sprint", Some("array")),
                    FieldDefinition::new("customfield_10020", "Sprint", Some("any")),
                    FieldDefinition::new("duedate", "Due date", Some("date")),
                    FieldDefinition::new("summary", "Summary", Some("string"))];
    store.replace_catalog(&defs).expect("replace");

    assert_eq!(store.create_dynamic_table("jf_dynamic_wide").expect("create"), 4);

    let mut conn = pool.get().expect("conn");
    let columns: Vec<ColumnInfo> = diesel::sql_query("SELECT column_name::text AS column_name, data_type::text AS data_type \
                                                      FROM information_schema.columns \
                                                      WHERE table_name = 'jf_dynamic_wide' ORDER BY ordinal_position")
        .load(&mut conn)
        .expect("columns");
    let got: Vec<(&str, &str)> = columns.iter()
                                        .map(|c| (c.column_name.as_str(), c.data_type.as_str()))
                                        .collect();
    assert_eq!(got,
               vec![("Sprint", "ARRAY"),
                    ("Sprint_1", "jsonb"),
                    ("Due date", "date"),
                    ("Summary", "character varying")]);

    assert!(matches!(store.create_dynamic_table("bad name"), Err(PersistenceError::Config(_))));
}
