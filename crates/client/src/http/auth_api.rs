//! The plain client role: credential endpoints, no interceptor.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use url::Url;

use crate::error::ApiError;
use crate::types::{LoginResponse, RegisterRequest};

use super::response::{expect_success, status_error, unwrap_envelope};

/// Plain client for the credential endpoints.
///
/// Runs on its own `reqwest::Client` and never reads the token store, so
/// a 401 from these endpoints is just an error - it can never trigger the
/// refresh protocol, and the refresh call itself cannot recurse.
#[derive(Clone)]
pub struct AuthApi {
    inner: Arc<AuthApiInner>,
}

struct AuthApiInner {
    http: reqwest::Client,
    api_root: Url,
}

/// Tokens issued by `/auth/refresh`.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    /// The new access token.
    pub token: String,
    /// A rotated refresh token, when the backend issues one.
    pub refresh_token: Option<String>,
}

impl AuthApi {
    /// Create the plain client role.
    #[must_use]
    pub fn new(http: reqwest::Client, api_root: Url) -> Self {
        Self {
            inner: Arc::new(AuthApiInner { http, api_root }),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .api_root
            .join(path)
            .map_err(|e| ApiError::Url(e.to_string()))
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's message for rejected
    /// credentials; the session layer turns that into a login failure
    /// outcome rather than propagating it.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("auth/login")?)
            .json(&json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .send()
            .await?;
        super::response::decode_json(response).await
    }

    /// `POST /auth/register`. Does not establish a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's validation message.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("auth/register")?)
            .json(&register_body(request))
            .send()
            .await?;
        expect_success(response).await
    }

    /// `POST /auth/refresh`: exchange the refresh token for a new access
    /// token.
    ///
    /// The backend has wired the response as `{ data: { token } }`, as
    /// `{ accessToken }`, and as a bare string; all three are accepted. A
    /// rotated refresh token is returned when present.
    ///
    /// # Errors
    ///
    /// Any failure here is terminal for the session - the caller clears
    /// local state rather than retrying.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("auth/refresh")?)
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        parse_refresh_body(&body)
    }

    /// `POST /auth/forgot-password`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's message.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("auth/forgot-password")?)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        expect_success(response).await
    }

    /// `POST /auth/reset-password`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for an invalid or expired reset token.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &SecretString,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("auth/reset-password")?)
            .json(&json!({
                "token": reset_token,
                "newPassword": new_password.expose_secret(),
            }))
            .send()
            .await?;
        expect_success(response).await
    }
}

/// The password leaves its [`SecretString`] wrapper here, at the last
/// moment before serialization.
fn register_body(request: &RegisterRequest) -> serde_json::Value {
    let mut body = json!({
        "username": request.username,
        "password": request.password.expose_secret(),
        "email": request.email,
    });
    let fields = [
        ("fullName", &request.full_name),
        ("phone", &request.phone),
        ("address", &request.address),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            body[key] = json!(value);
        }
    }
    if let Some(gender) = request.gender {
        body["gender"] = json!(gender);
    }
    body
}

fn parse_refresh_body(body: &str) -> Result<RefreshedTokens, ApiError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RefreshBody {
        Tokens {
            #[serde(alias = "accessToken")]
            token: String,
            #[serde(default, rename = "refreshToken")]
            refresh_token: Option<String>,
        },
        Bare(String),
    }

    let value: serde_json::Value = serde_json::from_str(body)?;
    let payload = unwrap_envelope(value);
    let parsed: RefreshBody = serde_json::from_value(payload)?;
    Ok(match parsed {
        RefreshBody::Tokens {
            token,
            refresh_token,
        } => RefreshedTokens {
            token,
            refresh_token,
        },
        RefreshBody::Bare(token) => RefreshedTokens {
            token,
            refresh_token: None,
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_request() -> RegisterRequest {
        RegisterRequest {
            username: "minh".to_owned(),
            password: SecretString::from("hunter2"),
            email: "minh@example.com".to_owned(),
            full_name: Some("Minh Nguyen".to_owned()),
            phone: None,
            address: None,
            gender: None,
        }
    }

    #[test]
    fn test_register_body_exposes_the_password_only_on_the_wire() {
        let body = register_body(&sample_request());
        assert_eq!(body["username"], "minh");
        assert_eq!(body["password"], "hunter2");
        assert_eq!(body["fullName"], "Minh Nguyen");
        assert!(body.get("phone").is_none());
    }

    #[test]
    fn test_register_request_debug_redacts_the_password() {
        let rendered = format!("{:?}", sample_request());
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_parse_refresh_enveloped_token() {
        let refreshed =
            parse_refresh_body(r#"{"success": true, "data": {"token": "new-access"}}"#).unwrap();
        assert_eq!(refreshed.token, "new-access");
        assert!(refreshed.refresh_token.is_none());
    }

    #[test]
    fn test_parse_refresh_access_token_field() {
        let refreshed = parse_refresh_body(r#"{"accessToken": "new-access"}"#).unwrap();
        assert_eq!(refreshed.token, "new-access");
    }

    #[test]
    fn test_parse_refresh_bare_string() {
        let refreshed = parse_refresh_body(r#""new-access""#).unwrap();
        assert_eq!(refreshed.token, "new-access");
    }

    #[test]
    fn test_parse_refresh_carries_rotated_refresh_token() {
        let refreshed = parse_refresh_body(
            r#"{"data": {"token": "new-access", "refreshToken": "new-refresh"}}"#,
        )
        .unwrap();
        assert_eq!(refreshed.refresh_token.as_deref(), Some("new-refresh"));
    }

    #[test]
    fn test_parse_refresh_rejects_garbage() {
        assert!(parse_refresh_body("{}").is_err());
        assert!(parse_refresh_body("42").is_err());
    }
}
