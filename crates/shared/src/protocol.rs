use std::fmt;

use serde::{Deserialize, Serialize};

/// Body posted to the Answer Gateway's `/ask` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Success-range response body from the Answer Gateway.
///
/// A missing `sources` field is tolerated and read as an empty list; a
/// missing `answer` field is a malformed reply and rejected by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

/// Error-range response body. The gateway may omit the message entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// One unit of supporting evidence attached to an answer.
///
/// The gateway owns the shape; clients carry it opaquely and never
/// reorder, filter, or reach into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(pub serde_json::Value);

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            other => f.write_str(&other.to_string()),
        }
    }
}
