use serde::Serialize;
use serde_json::{Value, json};

/// A status code and a JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// `{"message": ...}`
    pub fn message(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "message": message.into() }))
    }

    /// `{"error": ...}`, with `details` when there is an underlying failure.
    pub fn error(status: u16, error: impl Into<String>, details: Option<String>) -> Self {
        let body = match details {
            Some(details) => json!({ "error": error.into(), "details": details }),
            None => json!({ "error": error.into() }),
        };
        Self::new(status, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body() {
        assert_eq!(
            Response::error(400, "Invalid JSON format", None).body,
            json!({"error": "Invalid JSON format"})
        );
        assert_eq!(
            Response::error(500, "Failed to save data", Some("timeout".into())).body,
            json!({"error": "Failed to save data", "details": "timeout"})
        );
    }

    #[test]
    fn test_is_success() {
        assert!(Response::message(201, "ok").is_success());
        assert!(!Response::error(404, "nope", None).is_success());
    }

    #[test]
    fn test_serializes_status_and_body() {
        let rendered = serde_json::to_value(Response::message(200, "ok")).unwrap();
        assert_eq!(rendered, json!({"status": 200, "body": {"message": "ok"}}));
    }
}
