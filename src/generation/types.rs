use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for `POST /generate`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// Successful `/generate` body.
///
/// Only `response` is required. A server-assigned `id` is picked out when
/// present; everything else is carried through untouched in `extra`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error body for non-2xx responses. `detail` is the FastAPI convention.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Human-readable detail, if the server sent one as a string.
    /// Validation errors arrive as arrays/objects and are ignored here.
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// Accepts `"id": "abc"`, `"id": 42`, or `"id": null`.
fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
