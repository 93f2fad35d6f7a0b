//! Replayable request bodies.
//!
//! The decorated client may send a request twice (once, then once more
//! after a token refresh), so bodies are held in an owned, rebuildable
//! form rather than as a consumed `reqwest` body stream.

/// An owned request body that can be attached to a request any number of
/// times.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON body; reqwest sets the JSON content type.
    Json(serde_json::Value),
    /// URL-encoded form body.
    Form(Vec<(String, String)>),
    /// Multipart body; reqwest sets the boundary content type. Never
    /// forced to JSON.
    Multipart(Vec<MultipartPart>),
}

impl RequestBody {
    /// Build a JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns the serialization error for values that cannot be
    /// represented as JSON.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Rebuild a `reqwest` multipart form from owned parts.
    pub(crate) fn to_multipart_form(parts: &[MultipartPart]) -> reqwest::multipart::Form {
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            form = match part {
                MultipartPart::Text { name, value } => form.text(name.clone(), value.clone()),
                MultipartPart::File {
                    name,
                    file_name,
                    mime,
                    data,
                } => {
                    let mut file_part = reqwest::multipart::Part::bytes(data.clone())
                        .file_name(file_name.clone());
                    if let Ok(with_mime) = file_part.mime_str(mime) {
                        file_part = with_mime;
                    } else {
                        // An invalid mime string falls back to octet-stream.
                        file_part = reqwest::multipart::Part::bytes(data.clone())
                            .file_name(file_name.clone());
                    }
                    form.part(name.clone(), file_part)
                }
            };
        }
        form
    }
}

/// One owned part of a multipart body.
#[derive(Debug, Clone)]
pub enum MultipartPart {
    /// A plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A file upload field.
    File {
        /// Field name.
        name: String,
        /// Uploaded file name.
        file_name: String,
        /// Content type of the file.
        mime: String,
        /// File contents.
        data: Vec<u8>,
    },
}

impl MultipartPart {
    /// A text field part.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A file part.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            data,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_from_value() {
        let body = RequestBody::json(&serde_json::json!({"productId": 1, "quantity": 2})).unwrap();
        match body {
            RequestBody::Json(v) => assert_eq!(v["quantity"], 2),
            _ => panic!("expected JSON body"),
        }
    }

    #[test]
    fn test_multipart_form_rebuilds_from_owned_parts() {
        let parts = vec![
            MultipartPart::text("product", r#"{"name":"ThinkPad"}"#),
            MultipartPart::file("image", "thinkpad.png", "image/png", vec![1, 2, 3]),
        ];
        // Building twice must work - that is the whole point of owned parts.
        let _first = RequestBody::to_multipart_form(&parts);
        let _second = RequestBody::to_multipart_form(&parts);
    }
}
