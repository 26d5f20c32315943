use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Top-level error for one export run.
#[derive(Debug, ThisError)]
pub enum GsheetError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Row {row} has {cells} cells but the header has {width} columns")]
    RaggedRow {
        row: usize,
        cells: usize,
        width: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Output I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for GsheetError {
    fn from(e: figment::Error) -> Self {
        GsheetError::Config(Box::new(e))
    }
}

/// Failures while obtaining or persisting a credential.
#[derive(Debug, ThisError)]
pub enum AuthError {
    #[error("Client configuration file not found: {}", .0.display())]
    ClientSecretsMissing(PathBuf),

    #[error("Invalid client configuration: {0}")]
    InvalidClientSecrets(String),

    #[error("User consent was denied: {0}")]
    ConsentDenied(String),

    #[error("OAuth flow error: {0}")]
    OauthFlow(String),

    #[error("OAuth2 token request error: {0}")]
    Oauth2Token(String),

    #[error("OAuth2 server error: {error}")]
    Oauth2Server {
        error: String,
        description: Option<String>,
    },

    #[error("Missing access token in credential")]
    MissingAccessToken,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Credential I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// The token endpoint rejected the refresh token itself (revoked or expired).
    pub fn is_revoked_grant(&self) -> bool {
        matches!(self, AuthError::Oauth2Server { error, .. } if error == "invalid_grant")
    }
}

impl
    From<
        RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    > for AuthError
{
    fn from(
        e: RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    ) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => AuthError::Oauth2Server {
                error: err.error().to_string(),
                description: err.error_description().cloned(),
            },
            RequestTokenError::Request(req_e) => {
                AuthError::Oauth2Token(format!("request failed: {}", req_e))
            }
            RequestTokenError::Parse(parse_err, _body) => AuthError::Json(parse_err.into_inner()),
            RequestTokenError::Other(s) => AuthError::Oauth2Token(s),
        }
    }
}

/// Failures of the remote `values.get` call.
#[derive(Debug, ThisError)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid Sheets API URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Sheets API base URL cannot carry a path: {0}")]
    InvalidBaseUrl(String),

    #[error("Sheets API error {status} ({reason}): {message}")]
    Upstream {
        status: StatusCode,
        reason: String,
        message: String,
    },

    #[error("Malformed Sheets API response: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Upstream { status, .. } => Some(*status),
            FetchError::Reqwest(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::FORBIDDEN) | Some(StatusCode::UNAUTHORIZED)
        )
    }
}

/// Google API error response structure
#[derive(Deserialize, Debug)]
pub struct GoogleApiError {
    pub error: GoogleApiErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct GoogleApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

impl GoogleApiError {
    /// Build an upstream error from a non-success status and its raw body.
    pub fn into_fetch_error(status: StatusCode, body: &[u8]) -> FetchError {
        match serde_json::from_slice::<GoogleApiError>(body) {
            Ok(parsed) if !parsed.error.status.is_empty() => FetchError::Upstream {
                status,
                reason: parsed.error.status,
                message: parsed.error.message,
            },
            Ok(parsed) => FetchError::Upstream {
                status,
                reason: canonical_reason(status),
                message: parsed.error.message,
            },
            Err(_) => FetchError::Upstream {
                status,
                reason: canonical_reason(status),
                message: String::from_utf8_lossy(body).trim().to_string(),
            },
        }
    }
}

fn canonical_reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("UNKNOWN").to_string()
}
