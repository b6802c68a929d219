use jira_domain::{CollisionPolicy, DomainError, FieldNameNormalizer, FieldRow, FieldStore, FieldTree, FlattenReport,
                  Flattener, InMemoryFieldStore, InMemoryIssueSource, IssueSource};
use jiraflow_rust::{migrate_issue, RunConfig, RunError, RunOutcome};
use serde_json::{json, Value};

fn tree(value: Value) -> FieldTree {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn ids(store: &InMemoryFieldStore) -> Vec<&str> {
    store.rows().iter().map(|r| r.field_id.as_str()).collect()
}

fn default_flattener() -> Flattener {
    RunConfig::default().flattener()
}

#[test]
fn leaves_become_rows_with_normalized_names() {
    let source = InMemoryIssueSource::new().with_issue("MSSCI-1",
                                                       tree(json!({
                                                           "Summary": "Fix bug",
                                                           "a": {"b": 1, "c": 2},
                                                           "tags": ["x", "y"]
                                                       })));
    let mut store = InMemoryFieldStore::new();

    let outcome = migrate_issue(&source, &mut store, "MSSCI-1", &default_flattener()).unwrap();

    assert_eq!(outcome,
               RunOutcome::Written(FlattenReport { rows_inserted: 5,
                                                   collisions_resolved: 0 }));
    assert_eq!(store.recreate_calls(), 1);
    let rows: Vec<FieldRow> = store.rows().into_iter().cloned().collect();
    assert_eq!(rows,
               vec![FieldRow::new("Summary", "mss_summary", json!("Fix bug")),
                    FieldRow::new("a_b", "mss_b", json!(1)),
                    FieldRow::new("a_c", "mss_c", json!(2)),
                    FieldRow::new("tags_0", "mss_0", json!("x")),
                    FieldRow::new("tags_1", "mss_1", json!("y"))]);
}

#[test]
fn fetch_failure_skips_table_phases() {
    let source = InMemoryIssueSource::new();
    let mut store = InMemoryFieldStore::new();

    let err = migrate_issue(&source, &mut store, "MSSCI-404", &default_flattener()).unwrap_err();

    match err {
        RunError::Fetch { target, error } => {
            assert_eq!(target, "issue MSSCI-404");
            assert!(matches!(error, DomainError::NotFound(_)));
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
    assert_eq!(store.recreate_calls(), 0);
    assert!(!store.table_exists());
}

#[test]
fn empty_field_set_leaves_table_untouched() {
    let source = InMemoryIssueSource::new().with_issue("MSSCI-1", FieldTree::new());
    let mut store = InMemoryFieldStore::new();

    let outcome = migrate_issue(&source, &mut store, "MSSCI-1", &default_flattener()).unwrap();

    assert_eq!(outcome, RunOutcome::NoFields);
    assert_eq!(store.recreate_calls(), 0);
}

#[test]
fn rerun_with_same_input_yields_same_rows() {
    let fields = tree(json!({"Status": {"name": "Open", "id": "1"}, "labels": ["a", "b"], "due": null}));
    let source = InMemoryIssueSource::new().with_issue("MSSCI-1", fields);
    let mut store = InMemoryFieldStore::new();
    let flattener = default_flattener();

    migrate_issue(&source, &mut store, "MSSCI-1", &flattener).unwrap();
    let first: Vec<FieldRow> = store.rows().into_iter().cloned().collect();
    migrate_issue(&source, &mut store, "MSSCI-1", &flattener).unwrap();
    let second: Vec<FieldRow> = store.rows().into_iter().cloned().collect();

    assert_eq!(first, second);
    assert_eq!(store.recreate_calls(), 2);
    assert_eq!(store.get("due").map(|r| &r.field_value), Some(&Value::Null));
}

#[test]
fn recreate_drops_rows_of_previous_issue() {
    let source = InMemoryIssueSource::new().with_issue("A-1", tree(json!({"old": 1})))
                                           .with_issue("B-1", tree(json!({"new": 2})));
    let mut store = InMemoryFieldStore::new();
    let flattener = default_flattener();

    migrate_issue(&source, &mut store, "A-1", &flattener).unwrap();
    migrate_issue(&source, &mut store, "B-1", &flattener).unwrap();

    assert_eq!(ids(&store), vec!["new"]);
}

#[test]
fn every_colliding_path_gets_a_unique_id() {
    let fields = tree(json!({
        "a_b_c": 1,
        "a_b": {"c": 2},
        "a": {"b_c": 3, "b": {"c": 4}}
    }));
    let source = InMemoryIssueSource::new().with_issue("MSSCI-1", fields);
    let mut store = InMemoryFieldStore::new();

    let outcome = migrate_issue(&source, &mut store, "MSSCI-1", &default_flattener()).unwrap();

    assert_eq!(outcome,
               RunOutcome::Written(FlattenReport { rows_inserted: 4,
                                                   collisions_resolved: 3 }));
    assert_eq!(ids(&store), vec!["a_b_c", "a_b_c_0", "a_b_c_1", "a_b_c_2"]);
    assert!(store.rows().iter().all(|r| r.field_name == "mss_c"));
}

#[test]
fn custom_field_names_use_last_path_segment() {
    let fields = tree(json!({
        "customfield_10010": "Sprint 1",
        "Fix Versions": [{"self_link": "https://tracker.example.net/v/1", "name": "1.0"}]
    }));
    let source = InMemoryIssueSource::new().with_issue("MSSCI-1", fields);
    let mut store = InMemoryFieldStore::new();

    migrate_issue(&source, &mut store, "MSSCI-1", &default_flattener()).unwrap();

    let names: Vec<(&str, &str)> = store.rows()
                                        .iter()
                                        .map(|r| (r.field_id.as_str(), r.field_name.as_str()))
                                        .collect();
    assert_eq!(names,
               vec![("customfield_10010", "mss_10010"),
                    ("Fix Versions_0_self_link", "mss_link"),
                    ("Fix Versions_0_name", "mss_name")]);
}

#[test]
fn single_retry_fails_on_second_collision_and_rolls_back() {
    let fields = tree(json!({"first": 1, "x_y_z": 1, "x": {"y_z": 2}, "x_y": {"z": 3}}));
    let source = InMemoryIssueSource::new().with_issue("MSSCI-1", fields);
    let mut store = InMemoryFieldStore::new();
    let flattener = Flattener::new(FieldNameNormalizer::default(), CollisionPolicy::SingleRetry);

    let err = migrate_issue(&source, &mut store, "MSSCI-1", &flattener).unwrap_err();

    assert!(matches!(err, RunError::Write(DomainError::UnresolvedCollision(ref id)) if id == "x_y_z"));
    assert!(store.table_exists());
    assert!(store.is_empty());
}

#[test]
fn custom_prefix_flows_into_field_names() {
    let run = RunConfig { field_prefix: "ops_".into(),
                          ..RunConfig::default() };
    let source = InMemoryIssueSource::new().with_issue("MSSCI-1", tree(json!({"Story Points": 5})));
    let mut store = InMemoryFieldStore::new();

    migrate_issue(&source, &mut store, "MSSCI-1", &run.flattener()).unwrap();

    assert_eq!(store.get("Story Points").map(|r| r.field_name.as_str()), Some("ops_story_points"));
}

/// Destino cuya recreación siempre falla; cuenta las escrituras intentadas.
#[derive(Default)]
struct BrokenDdlStore {
    writes: usize,
}

impl FieldStore for BrokenDdlStore {
    type Error = DomainError;

    fn recreate_table(&mut self) -> Result<(), DomainError> {
        Err(DomainError::NotFound("schema".into()))
    }

    fn write_tree(&mut self, _tree: &FieldTree, _flattener: &Flattener) -> Result<FlattenReport, DomainError> {
        self.writes += 1;
        Ok(FlattenReport::default())
    }
}

#[test]
fn recreate_failure_stops_before_writing() {
    let source = InMemoryIssueSource::new().with_issue("MSSCI-1", tree(json!({"a": 1})));
    let mut store = BrokenDdlStore::default();

    let err = migrate_issue(&source, &mut store, "MSSCI-1", &default_flattener()).unwrap_err();

    assert!(matches!(err, RunError::CreateTable(_)));
    assert_eq!(store.writes, 0);
}

#[test]
fn legacy_fetch_collapses_failure_to_empty_map() {
    let source = InMemoryIssueSource::new();
    assert!(source.fetch_fields_or_empty("MSSCI-1").is_empty());
}
