//! Transport envelope: maps a run's outcome to a status code and JSON body.

use allocbook::Rebalance;
use serde::Serialize;

use crate::error::Error;

/// A response as an HTTP-style handler would return it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: Headers,
    /// JSON-encoded body: the record array on success, an error object otherwise.
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Headers {
    #[serde(rename = "Content-Type")]
    pub content_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl Response {
    pub fn ok(rebalance: &Rebalance) -> Self {
        let body = rebalance
            .to_json()
            .unwrap_or_else(|e| error_body("Serialization", e.to_string()));
        Self::new(200, body)
    }

    pub fn from_error(err: &Error) -> Self {
        let (status, kind, message) = match err {
            Error::Engine(e) => {
                let kind = e.kind();
                let status = if kind.is_input_error() { 400 } else { 500 };
                (status, kind.as_str(), e.to_string())
            }
            Error::RequestParse(e) => (400, "RequestParse", e.to_string()),
            other => (500, "Internal", other.to_string()),
        };
        Self::new(status, error_body(kind, message))
    }

    pub fn from_result(result: &Result<Rebalance, Error>) -> Self {
        match result {
            Ok(r) => Self::ok(r),
            Err(e) => Self::from_error(e),
        }
    }

    fn new(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            headers: Headers {
                content_type: "application/json",
            },
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

fn error_body(kind: &str, message: String) -> String {
    serde_json::to_string(&ErrorBody {
        error: kind,
        message,
    })
    .unwrap_or_else(|_| format!(r#"{{"error":"{kind}"}}"#))
}
