//! Access-token claim decoding.
//!
//! The access token is a compact JWT. The client only reads its payload -
//! subject, authority claims, expiry - to drive the admin predicate and
//! expiry checks; signature verification belongs to the backend.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

/// Claims carried by the access token's payload segment.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject (username).
    #[serde(default)]
    pub sub: Option<String>,
    /// Authority claims, in any of the shapes the backend has used.
    #[serde(default, deserialize_with = "deserialize_authorities")]
    pub authorities: Vec<String>,
    /// Expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued-at, seconds since the Unix epoch.
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// Decode the payload of a compact JWT.
    ///
    /// Returns `None` for anything that is not three dot-separated
    /// segments with a base64url JSON payload. Malformed tokens never
    /// panic: the caller treats them like an absent token.
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        let mut segments = token.split('.');
        let _header = segments.next()?;
        let payload = segments.next()?;
        // A compact JWT has exactly a signature segment left.
        segments.next()?;
        if segments.next().is_some() {
            return None;
        }

        let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Whether the token has expired. A missing `exp` counts as expired:
    /// a token the client cannot vouch for grants nothing.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.exp
            .is_none_or(|exp| exp <= chrono::Utc::now().timestamp())
    }

    /// Whether the authority claims include `name`.
    #[must_use]
    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities.iter().any(|a| a == name)
    }
}

/// The backend has wired authorities as `["ROLE_ADMIN"]`, as
/// `[{"authority": "ROLE_ADMIN"}]`, and as a single space-separated
/// string. Accept all three.
fn deserialize_authorities<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Plain(String),
        Object { authority: String },
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<Entry>),
        Joined(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        None => Vec::new(),
        Some(Raw::List(entries)) => entries
            .into_iter()
            .map(|e| match e {
                Entry::Plain(s) => s,
                Entry::Object { authority } => authority,
            })
            .collect(),
        Some(Raw::Joined(s)) => s.split_whitespace().map(str::to_string).collect(),
    })
}
