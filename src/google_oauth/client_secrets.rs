use crate::config::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URI};
use crate::error::AuthError;
use serde::Deserialize;
use std::{fs, io, path::Path};

/// OAuth client identity from the console-issued client configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ClientSecrets {
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(AuthError::ClientSecretsMissing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&contents)
    }

    /// Accepts both the `installed` (desktop) and `web` client layouts.
    pub fn from_json(contents: &str) -> Result<Self, AuthError> {
        let file: ClientSecretsFile = serde_json::from_str(contents)?;
        file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidClientSecrets(
                "expected an `installed` or `web` client section".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_installed_client() {
        let secrets = ClientSecrets::from_json(
            r#"{"installed":{"client_id":"id.apps.googleusercontent.com","project_id":"demo",
            "auth_uri":"https://accounts.google.com/o/oauth2/auth",
            "token_uri":"https://oauth2.googleapis.com/token",
            "client_secret":"shh","redirect_uris":["http://localhost"]}}"#,
        )
        .unwrap();
        assert_eq!(secrets.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "shh");
        assert_eq!(secrets.token_uri, GOOGLE_TOKEN_URI);
    }

    #[test]
    fn parses_web_client_with_default_uris() {
        let secrets =
            ClientSecrets::from_json(r#"{"web":{"client_id":"w","client_secret":"s"}}"#).unwrap();
        assert_eq!(secrets.auth_uri, GOOGLE_AUTH_URL);
        assert_eq!(secrets.token_uri, GOOGLE_TOKEN_URI);
    }

    #[test]
    fn rejects_unknown_layout() {
        let err = ClientSecrets::from_json(r#"{"service_account":{}}"#).unwrap_err();
        assert!(matches!(err, AuthError::InvalidClientSecrets(_)));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let path = Path::new("/nonexistent/gsheet-csv/credentials.json");
        match ClientSecrets::from_file(path) {
            Err(AuthError::ClientSecretsMissing(p)) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
