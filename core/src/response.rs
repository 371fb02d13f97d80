//! Response interpretation for JSON endpoints.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::prefer_camel_case;

/// A successful response body, classified by what the server sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    /// 204, or a 2xx with an empty body.
    Empty,
    Json(Value),
    /// 2xx without a JSON content type.
    Text(String),
}

impl ApiBody {
    /// Deserialize into `T`. `Empty` is presented as JSON `null`, so it
    /// satisfies `Option<_>` and `()` targets.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let mut value = match self {
            ApiBody::Empty => Value::Null,
            ApiBody::Json(v) => v,
            ApiBody::Text(t) => {
                return Err(ApiError::Deserialization(format!(
                    "expected JSON, got text: {t}"
                )))
            }
        };
        prefer_camel_case(&mut value);
        serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// JSON value of the body; `Empty` becomes `null`, text becomes a string.
    pub fn into_value(self) -> Value {
        match self {
            ApiBody::Empty => Value::Null,
            ApiBody::Json(v) => v,
            ApiBody::Text(t) => Value::String(t),
        }
    }
}

/// Classify a JSON-endpoint response.
///
/// 204 is empty regardless of body. Failures surface the status together
/// with the body's `message` field, falling back to the raw text when the
/// body is not JSON, does not parse, or has no message.
pub fn parse_api_response(response: HttpResponse) -> Result<ApiBody, ApiError> {
    if response.status == 204 {
        return Ok(ApiBody::Empty);
    }

    if !response.is_success() {
        return Err(http_error(&response));
    }

    let text = response.text();
    if text.is_empty() {
        return Ok(ApiBody::Empty);
    }
    if response.is_json() {
        let value = serde_json::from_str(&text)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        return Ok(ApiBody::Json(value));
    }
    Ok(ApiBody::Text(text))
}

/// Shorthand for endpoints whose body is deserialized into `T`.
pub fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    parse_api_response(response)?.into_typed()
}

/// Endpoints whose body is irrelevant once the status is a success.
pub fn parse_unit(response: HttpResponse) -> Result<(), ApiError> {
    parse_api_response(response).map(|_| ())
}

pub(crate) fn http_error(response: &HttpResponse) -> ApiError {
    let raw = response.text();
    let parsed = if response.is_json() && !raw.is_empty() {
        serde_json::from_str::<Value>(&raw).ok()
    } else {
        None
    };

    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(|m| match m {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| raw.clone());
    let errors = parsed.and_then(|mut v| v.get_mut("errors").map(Value::take));

    ApiError::Http {
        status: response.status,
        message,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: content_type
                .map(|ct| vec![("Content-Type".to_string(), ct.to_string())])
                .unwrap_or_default(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn no_content_ignores_body() {
        let body = parse_api_response(resp(204, Some("application/json"), "not json")).unwrap();
        assert_eq!(body, ApiBody::Empty);
    }

    #[test]
    fn empty_success_is_empty() {
        let body = parse_api_response(resp(200, Some("application/json"), "")).unwrap();
        assert_eq!(body, ApiBody::Empty);
    }

    #[test]
    fn json_success_is_parsed() {
        let body = parse_api_response(resp(200, Some("application/json"), r#"{"id":7}"#)).unwrap();
        assert_eq!(body, ApiBody::Json(serde_json::json!({"id": 7})));
    }

    #[test]
    fn non_json_success_is_text() {
        let body = parse_api_response(resp(200, Some("text/plain"), "pong")).unwrap();
        assert_eq!(body, ApiBody::Text("pong".to_string()));
    }

    #[test]
    fn malformed_json_success_is_deserialization_error() {
        let err = parse_api_response(resp(200, Some("application/json"), "{oops")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn error_message_comes_from_json_body() {
        let err = parse_api_response(resp(
            422,
            Some("application/json"),
            r#"{"message":"The given data was invalid.","errors":{"email":["required"]}}"#,
        ))
        .unwrap_err();
        assert_eq!(err.to_string(), "API error 422: The given data was invalid.");
        match err {
            ApiError::Http { errors, .. } => {
                assert_eq!(errors, Some(serde_json::json!({"email": ["required"]})));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_json_error_falls_back_to_raw_text() {
        let err = parse_api_response(resp(500, Some("application/json"), "{broken")).unwrap_err();
        assert_eq!(err.to_string(), "API error 500: {broken");
    }

    #[test]
    fn json_error_without_message_uses_raw_text() {
        let err = parse_api_response(resp(400, Some("application/json"), r#"{"error":"x"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), r#"API error 400: {"error":"x"}"#);
    }

    #[test]
    fn plain_error_uses_raw_text() {
        let err = parse_api_response(resp(502, Some("text/html"), "Bad Gateway")).unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "API error 502: Bad Gateway");
    }

    #[test]
    fn unit_and_option_targets_accept_empty() {
        parse_unit(resp(204, None, "")).unwrap();
        let none: Option<u32> = parse_json(resp(200, None, "")).unwrap();
        assert!(none.is_none());
    }
}
