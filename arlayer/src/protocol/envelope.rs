//! Request and response envelopes.
//!
//! Every response is a flat JSON object:
//!
//! ```json
//! {"success": true, "model": {...}}
//! {"success": false, "error": "model not found: m1", "errorKind": "modelNotFound"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{DispatchError, ErrorKind};

/// Logical channel a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Session lifecycle, models, and tracking.
    #[default]
    Session,
    /// Target database management.
    Database,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Session => f.write_str("session"),
            Channel::Database => f.write_str("database"),
        }
    }
}

/// A method call from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub channel: Channel,
    pub method: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl Request {
    /// A session-channel request with no arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            channel: Channel::Session,
            method: method.into(),
            arguments: Map::new(),
        }
    }

    /// A database-channel request with no arguments.
    pub fn database(method: impl Into<String>) -> Self {
        Self {
            channel: Channel::Database,
            ..Self::new(method)
        }
    }

    /// Add an argument.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }
}

/// The reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Response {
    /// Success with no payload.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            error_kind: None,
            payload: Map::new(),
        }
    }

    /// Success with one payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Success whose payload is the fields of `body`.
    ///
    /// # Errors
    ///
    /// Fails if `body` does not serialize to a JSON object.
    pub fn from_body<T: Serialize>(body: &T) -> Result<Self, DispatchError> {
        match serde_json::to_value(body) {
            Ok(Value::Object(payload)) => Ok(Self {
                payload,
                ..Self::ok()
            }),
            Ok(other) => Err(DispatchError::Internal(format!(
                "response body is not an object: {}",
                other
            ))),
            Err(e) => Err(DispatchError::Internal(e.to_string())),
        }
    }

    /// Failure of the given kind.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            error_kind: Some(kind),
            payload: Map::new(),
        }
    }

    /// Look up a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

impl From<DispatchError> for Response {
    fn from(e: DispatchError) -> Self {
        Response::failure(e.kind(), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults_to_session_channel() {
        let request: Request = serde_json::from_value(json!({"method": "startSession"})).unwrap();
        assert_eq!(request.channel, Channel::Session);
        assert!(request.arguments.is_empty());
    }

    #[test]
    fn test_request_database_channel() {
        let request: Request = serde_json::from_value(
            json!({"channel": "database", "method": "getDatabaseStats"}),
        )
        .unwrap();
        assert_eq!(request.channel, Channel::Database);
    }

    #[test]
    fn test_success_envelope_is_flat() {
        let response = Response::ok().with("bodyTrackingEnabled", true);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"success": true, "bodyTrackingEnabled": true}));
    }

    #[test]
    fn test_failure_envelope() {
        let response = Response::failure(ErrorKind::ModelNotFound, "model not found: m1");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": "model not found: m1",
                "errorKind": "modelNotFound"
            })
        );
    }

    #[test]
    fn test_from_body_rejects_non_object() {
        assert!(Response::from_body(&42).is_err());
        let response = Response::from_body(&json!({"a": 1})).unwrap();
        assert_eq!(response.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_response_roundtrips_payload() {
        let text = r#"{"success":true,"models":[]}"#;
        let response: Response = serde_json::from_str(text).unwrap();
        assert!(response.success);
        assert_eq!(response.get("models"), Some(&json!([])));
    }
}
