//! Backend call failures and rendering of server-provided error bodies.

use serde::Deserialize;
use serde_json::Value;

/// Errors from a backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("backend returned HTTP {status}{}", suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    /// The request never produced a response (connection refused, reset...).
    #[error("transport error: {0}")]
    Transport(String),

    /// A success response whose body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-provided detail text, when the error body carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// The server's detail, or `fallback` when there is no usable body.
    pub fn message_or(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_owned()
    }
}

fn suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Error body shape: `{ "detail": "..." }` or
/// `{ "detail": [{ "loc": [...], "msg": "..." }, ...] }`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<Detail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Detail {
    Text(String),
    Items(Vec<DetailItem>),
}

#[derive(Debug, Deserialize)]
pub struct DetailItem {
    pub loc: Option<Vec<Value>>,
    pub msg: Option<String>,
}

impl DetailItem {
    fn render(&self) -> String {
        let loc = match &self.loc {
            Some(parts) => parts
                .iter()
                .map(|p| match p {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("."),
            None => "unknown".to_string(),
        };
        format!("{loc} - {}", self.msg.as_deref().unwrap_or_default())
    }
}

impl Detail {
    /// Render for display: text as-is, items as `loc.path - msg` joined by `; `.
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Items(items) => items
                .iter()
                .map(DetailItem::render)
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

/// Render the `detail` of an error body, if the body has a usable one.
pub fn render_error_body(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    let rendered = parsed.detail?.render();
    (!rendered.is_empty()).then_some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail() {
        let body = br#"{"detail": "No exercise predictions found for session ID: abc."}"#;
        assert_eq!(
            render_error_body(body).as_deref(),
            Some("No exercise predictions found for session ID: abc.")
        );
    }

    #[test]
    fn validation_detail_list() {
        let body = br#"{"detail": [{"loc": ["body", "age"], "msg": "required"}]}"#;
        assert_eq!(render_error_body(body).as_deref(), Some("body.age - required"));
    }

    #[test]
    fn multiple_items_joined_with_semicolons() {
        let body = br#"{"detail": [
            {"loc": ["body", "age"], "msg": "required", "type": "missing"},
            {"loc": ["body", "items", 0], "msg": "bad item"},
            {"msg": "no location"}
        ]}"#;
        assert_eq!(
            render_error_body(body).as_deref(),
            Some("body.age - required; body.items.0 - bad item; unknown - no location")
        );
    }

    #[test]
    fn unusable_bodies() {
        assert_eq!(render_error_body(b""), None);
        assert_eq!(render_error_body(b"<html>502</html>"), None);
        assert_eq!(render_error_body(br#"{"error": "x"}"#), None);
        assert_eq!(render_error_body(br#"{"detail": ""}"#), None);
    }

    #[test]
    fn message_or_prefers_detail() {
        let with_detail = ApiError::Status {
            status: 422,
            detail: Some("body.age - required".into()),
        };
        assert_eq!(with_detail.message_or("fallback"), "body.age - required");

        let bare = ApiError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(bare.message_or("fallback"), "fallback");
        assert_eq!(ApiError::Transport("refused".into()).message_or("fallback"), "fallback");
    }

    #[test]
    fn display_includes_status_and_detail() {
        let err = ApiError::Status {
            status: 404,
            detail: Some("missing".into()),
        };
        assert_eq!(err.to_string(), "backend returned HTTP 404: missing");
        let err = ApiError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "backend returned HTTP 500");
    }
}
