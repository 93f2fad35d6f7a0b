//! Response-envelope decoding and error-message extraction.
//!
//! The backend wraps most payloads as `{ success, message, data }`, but
//! not all of them: typed decoding uses `data` when it is present and
//! non-null, otherwise the raw body. Error messages come from `message`,
//! then `error`, then a truncated excerpt of the body.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::Page;

/// Longest body excerpt carried into an error message.
const ERROR_EXCERPT_LEN: usize = 200;

/// Decode a response into `T`, applying the envelope rule.
///
/// Non-success statuses become [`ApiError::Status`] with the extracted
/// message; 401 is the caller's business and is handled before this.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(status_error(status.as_u16(), &body));
    }
    decode_body(&body)
}

/// Decode a success body into `T`, unwrapping `{ data: ... }` when present.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value = serde_json::from_str(body)?;
    Ok(serde_json::from_value(unwrap_envelope(value))?)
}

/// Check the status of a response whose body the caller does not need.
pub(crate) async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), &body))
}

/// `data` when present and non-null, otherwise the raw body.
pub(crate) fn unwrap_envelope(mut value: Value) -> Value {
    match value.get_mut("data") {
        Some(data) if !data.is_null() => data.take(),
        _ => value,
    }
}

/// Build the status error for a non-success response body.
pub(crate) fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(Value::as_str)
                .or_else(|| v.get("error").and_then(Value::as_str))
                .map(str::to_string)
        })
        .unwrap_or_else(|| excerpt(body));
    ApiError::Status { status, message }
}

/// Decode a paged payload, tolerating both the pageable object shape and a
/// bare JSON array (older endpoints return one or the other).
pub(crate) fn decode_page<T: DeserializeOwned>(value: Value) -> Result<Page<T>, ApiError> {
    if value.is_array() {
        let content: Vec<T> = serde_json::from_value(value)?;
        return Ok(Page::from_content(content));
    }
    Ok(serde_json::from_value(value)?)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response body)".to_string();
    }
    let mut end = ERROR_EXCERPT_LEN.min(trimmed.len());
    // Do not cut through a UTF-8 sequence.
    while end < trimmed.len() && !trimmed.is_char_boundary(end) {
        end += 1;
    }
    trimmed.get(..end).unwrap_or(trimmed).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_unwraps_data() {
        let value = json!({"success": true, "data": {"id": 1}});
        assert_eq!(unwrap_envelope(value), json!({"id": 1}));
    }

    #[test]
    fn test_envelope_falls_back_to_raw_body() {
        let value = json!({"id": 1, "name": "ThinkPad"});
        assert_eq!(unwrap_envelope(value.clone()), value);
    }

    #[test]
    fn test_envelope_null_data_falls_back_to_raw_body() {
        let value = json!({"success": true, "data": null});
        assert_eq!(unwrap_envelope(value.clone()), value);
    }

    #[test]
    fn test_status_error_prefers_message_field() {
        let err = status_error(400, r#"{"message": "Username already exists", "error": "Bad"}"#);
        assert_eq!(err.status_message(), Some("Username already exists"));
    }

    #[test]
    fn test_status_error_falls_back_to_error_field() {
        let err = status_error(400, r#"{"error": "Bad request"}"#);
        assert_eq!(err.status_message(), Some("Bad request"));
    }

    #[test]
    fn test_status_error_excerpts_non_json_body() {
        let err = status_error(502, "<html>Bad Gateway</html>");
        assert_eq!(err.status_message(), Some("<html>Bad Gateway</html>"));
    }

    #[test]
    fn test_status_error_excerpt_is_bounded() {
        let long = "x".repeat(5000);
        let err = status_error(500, &long);
        assert_eq!(err.status_message().unwrap().len(), ERROR_EXCERPT_LEN);
    }

    #[test]
    fn test_decode_page_accepts_bare_array() {
        let page: Page<i64> = decode_page(json!([1, 2, 3])).unwrap();
        assert_eq!(page.content, vec![1, 2, 3]);
        assert_eq!(page.total_elements, 3);
    }

    #[test]
    fn test_decode_page_accepts_pageable_object() {
        let page: Page<i64> = decode_page(json!({
            "content": [7],
            "totalPages": 4,
            "totalElements": 31,
            "number": 0,
            "size": 8
        }))
        .unwrap();
        assert_eq!(page.content, vec![7]);
        assert_eq!(page.total_pages, 4);
    }
}
