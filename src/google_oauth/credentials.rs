use crate::config::GOOGLE_TOKEN_URI;
use crate::error::AuthError;
use crate::google_oauth::client_secrets::ClientSecrets;
use crate::google_oauth::endpoints::GoogleTokenResponse;
use chrono::{DateTime, Duration, Utc};
use oauth2::TokenResponse;
use serde::{Deserialize, Serialize};

/// Tokens are treated as expired this many seconds before their actual expiry.
pub const EXPIRY_SKEW_SECS: i64 = 225;

/// Cached OAuth credential in the "authorized user" JSON layout used by the
/// Google client libraries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleCredential {
    #[serde(rename = "token", default)]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl GoogleCredential {
    /// Build a credential from the token endpoint's response to a code exchange.
    pub fn from_token_response(
        secrets: &ClientSecrets,
        requested_scopes: &[String],
        resp: &GoogleTokenResponse,
        now: DateTime<Utc>,
    ) -> Self {
        let mut cred = GoogleCredential {
            access_token: None,
            refresh_token: None,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes: requested_scopes.to_vec(),
            expiry: None,
        };
        cred.apply_token_response(resp, now);
        cred
    }

    /// Merge a token response into this credential. A refresh response usually
    /// omits `refresh_token`; the existing one is kept in that case.
    pub fn apply_token_response(&mut self, resp: &GoogleTokenResponse, now: DateTime<Utc>) {
        self.access_token = Some(resp.access_token().secret().to_string());
        if let Some(rt) = resp.refresh_token() {
            self.refresh_token = Some(rt.secret().to_string());
        }
        self.expiry = resp
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .map(|d| now + d);
        if let Some(scopes) = resp.scopes() {
            self.scopes = scopes.iter().map(|s| s.as_str().to_owned()).collect();
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| now >= expiry - Duration::seconds(EXPIRY_SKEW_SECS))
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_some() && !self.is_expired_at(now)
    }

    /// Whether every requested scope was granted. Token files without a scope
    /// list are assumed to cover the request.
    pub fn covers_scopes(&self, requested: &[String]) -> bool {
        self.scopes.is_empty() || requested.iter().all(|s| self.scopes.contains(s))
    }

    pub fn access_token(&self) -> Result<&str, AuthError> {
        self.access_token
            .as_deref()
            .ok_or(AuthError::MissingAccessToken)
    }
}
