//! Wire messages
//!
//! Each message is one JSON object terminated by `\n`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::codec::LinesCodec;

use crate::version::ApiVersion;

/// Method every server answers with its own group and version
pub const VERSION_METHOD: &str = "rpc.version";

/// Longest message either side reads, terminator excluded
pub const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Line framing shared by servers and clients
pub(crate) fn line_codec() -> LinesCodec {
    LinesCodec::new_with_max_length(MAX_MESSAGE_LEN)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Response {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, error: ErrorObject) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Split into the call outcome. A missing or `null` result is `Value::Null`.
    pub fn into_result(self) -> Result<Value, ErrorObject> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ParseError,
    MethodNotFound,
    InvalidParams,
    VersionTooOld,
    Internal,
}

/// Result of [`VERSION_METHOD`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub group: String,
    pub version: ApiVersion,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_without_params_defaults_to_null() {
        let request: Request =
            serde_json::from_value(json!({"id": 3, "method": "GetInfo"})).unwrap();

        assert_eq!(request.params, Value::Null);
    }

    #[test]
    fn success_response_omits_error() {
        let value = serde_json::to_value(Response::success(1, json!({"ok": true}))).unwrap();

        assert_eq!(value, json!({"id": 1, "result": {"ok": true}}));
    }

    #[test]
    fn failure_response_carries_snake_case_code() {
        let response = Response::failure(
            2,
            ErrorObject {
                code: ErrorCode::VersionTooOld,
                message: "too old".to_string(),
            },
        );
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(
            value,
            json!({"id": 2, "error": {"code": "version_too_old", "message": "too old"}})
        );
    }

    #[test]
    fn null_result_is_success() {
        let response: Response =
            serde_json::from_value(json!({"id": 1, "result": null})).unwrap();

        assert_eq!(response.into_result(), Ok(Value::Null));
    }

    #[test]
    fn endpoint_info_renders_version_as_string() {
        let info = EndpointInfo {
            group: "disk".to_string(),
            version: ApiVersion::must("v1beta2"),
        };

        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({"group": "disk", "version": "v1beta2"})
        );
    }
}
