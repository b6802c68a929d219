use thiserror::Error;

/// Fallos al hablar con el tracker. Cada variante es un resultado distinto
/// para quien llama; ninguno se colapsa en "sin campos".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("authentication rejected by tracker (status {status})")]
    Unauthorized { status: u16 },
    #[error("issue {0} not found")]
    IssueNotFound(String),
    #[error("tracker returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed tracker response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Clasifica una respuesta no exitosa.
    pub fn from_status(status: u16, body: &str, issue_key: Option<&str>) -> Self {
        match (status, issue_key) {
            (401 | 403, _) => Self::Unauthorized { status },
            (404, Some(key)) => Self::IssueNotFound(key.to_string()),
            _ => Self::Status { status,
                                body: truncate(body, 512) },
        }
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(FetchError::from_status(401, "", Some("A-1")), FetchError::Unauthorized { status: 401 }));
        assert!(matches!(FetchError::from_status(403, "", None), FetchError::Unauthorized { status: 403 }));
        assert!(matches!(FetchError::from_status(404, "", Some("A-1")), FetchError::IssueNotFound(k) if k == "A-1"));
        assert!(matches!(FetchError::from_status(404, "gone", None), FetchError::Status { status: 404, .. }));
        assert!(matches!(FetchError::from_status(500, "boom", Some("A-1")), FetchError::Status { status: 500, .. }));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        match FetchError::from_status(502, &body, None) {
            FetchError::Status { body, .. } => assert_eq!(body.len(), 515),
            other => panic!("unexpected {other:?}"),
        }
    }
}
