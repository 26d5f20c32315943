use crate::types::table::RaggedPolicy;
use clap::Parser;
use serde_json::{Map, Value, json};
use std::path::PathBuf;

/// Export a Google Sheets range to a CSV file.
#[derive(Debug, Parser)]
#[command(name = "gsheet-csv", version)]
pub struct Cli {
    /// TOML configuration file; a missing file is ignored
    #[arg(short, long, env = "GSHEET_CSV_CONFIG", default_value = "gsheet-csv.toml")]
    pub config: PathBuf,

    /// Spreadsheet id, or the sheet's full docs.google.com URL
    #[arg(short, long)]
    pub spreadsheet: Option<String>,

    /// A1-style range, e.g. `Sheet1!A1:Z1000`
    #[arg(short, long)]
    pub range: Option<String>,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// OAuth client configuration file
    #[arg(long)]
    pub client_secrets: Option<PathBuf>,

    /// Cached credential file
    #[arg(long)]
    pub token: Option<PathBuf>,

    /// Field delimiter (single ASCII character)
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Omit the UTF-8 byte-order mark
    #[arg(long)]
    pub no_bom: bool,

    /// Handling of rows wider than the header
    #[arg(long, value_enum)]
    pub ragged: Option<RaggedPolicy>,

    /// Print the consent URL without opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Loopback port for the consent redirect (0 picks a free port)
    #[arg(long)]
    pub callback_port: Option<u16>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    pub loglevel: Option<String>,
}

impl Cli {
    /// Only the values given on the command line, shaped like `Config`.
    pub fn overrides(&self) -> Value {
        let mut basic = Map::new();
        let mut auth = Map::new();
        let mut export = Map::new();

        if let Some(level) = &self.loglevel {
            basic.insert("loglevel".into(), json!(level));
        }

        if let Some(path) = &self.client_secrets {
            auth.insert("client_secrets".into(), json!(path));
        }
        if let Some(path) = &self.token {
            auth.insert("token_path".into(), json!(path));
        }
        if let Some(port) = self.callback_port {
            auth.insert("callback_port".into(), json!(port));
        }
        if self.no_browser {
            auth.insert("open_browser".into(), json!(false));
        }

        if let Some(id) = &self.spreadsheet {
            export.insert("spreadsheet_id".into(), json!(id));
        }
        if let Some(range) = &self.range {
            export.insert("range".into(), json!(range));
        }
        if let Some(path) = &self.output {
            export.insert("output".into(), json!(path));
        }
        if let Some(delimiter) = self.delimiter {
            export.insert("delimiter".into(), json!(delimiter));
        }
        if self.no_bom {
            export.insert("bom".into(), json!(false));
        }
        if let Some(policy) = self.ragged {
            export.insert("ragged".into(), json!(policy));
        }

        json!({ "basic": basic, "auth": auth, "export": export })
    }
}
