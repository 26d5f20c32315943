//! Runtime configuration.
//!
//! Layers, lowest to highest precedence: built-in defaults, a TOML file,
//! `GSHEET_CSV_*` environment variables (`__` separates sections) and the
//! flags given on the command line.

use crate::error::GsheetError;
use crate::types::table::RaggedPolicy;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com";
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

pub const ENV_PREFIX: &str = "GSHEET_CSV_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub auth: AuthConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub loglevel: String,
    pub proxy: Option<Url>,
    pub sheets_api_url: Url,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            proxy: None,
            sheets_api_url: Url::parse(SHEETS_API_URL).expect("valid built-in Sheets API URL"),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// OAuth client configuration downloaded from the Google Cloud console.
    pub client_secrets: PathBuf,
    /// Cached credential, created on first consent.
    pub token_path: PathBuf,
    pub scopes: Vec<String>,
    /// Loopback port for the consent redirect; 0 picks a free one.
    pub callback_port: u16,
    pub consent_timeout_secs: u64,
    pub open_browser: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secrets: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            scopes: vec![SHEETS_READONLY_SCOPE.to_string()],
            callback_port: 0,
            consent_timeout_secs: 300,
            open_browser: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Bare spreadsheet id or a full `docs.google.com/spreadsheets/d/...` URL.
    pub spreadsheet_id: String,
    pub range: String,
    pub output: PathBuf,
    pub delimiter: char,
    pub bom: bool,
    pub ragged: RaggedPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: "Sheet1!A1:Z1000".to_string(),
            output: PathBuf::from("output.csv"),
            delimiter: ',',
            bom: true,
            ragged: RaggedPolicy::default(),
        }
    }
}

impl Config {
    /// Assemble the layered configuration. `overrides` holds only the values
    /// explicitly set on the command line.
    pub fn load<T: Serialize>(config_file: &Path, overrides: T) -> Result<Self, GsheetError> {
        Self::figment(config_file)
            .merge(Serialized::defaults(overrides))
            .extract::<Config>()
            .map_err(GsheetError::from)
            .and_then(Config::validate)
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(self) -> Result<Self, GsheetError> {
        if self.export.spreadsheet_id.trim().is_empty() {
            return Err(GsheetError::InvalidConfig(
                "export.spreadsheet_id is required (use --spreadsheet)".to_string(),
            ));
        }
        if !self.export.delimiter.is_ascii() {
            return Err(GsheetError::InvalidConfig(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.export.delimiter
            )));
        }
        if self.auth.scopes.is_empty() {
            return Err(GsheetError::InvalidConfig(
                "auth.scopes must not be empty".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.export.delimiter as u8
    }
}
