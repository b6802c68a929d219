//! Esquema Diesel (manual). La tabla de filas aplanadas tiene nombre
//! configurable y se maneja con `sql_query`; aquí sólo va el catálogo.

diesel::table! {
    jira_fields (field_id) {
        field_id -> Text,
        field_name -> Text,
        field_type -> Text,
    }
}
