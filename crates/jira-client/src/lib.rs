//! jira-client
//!
//! Cliente HTTP bloqueante para la API REST v2 de Jira. Implementa
//! `jira_domain::IssueSource` (campos de una issue y catálogo de campos).

pub mod client;
pub mod config;
pub mod error;

pub use client::JiraClient;
pub use config::JiraConfig;
pub use error::FetchError;
