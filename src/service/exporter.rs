use crate::api::sheets_api::SheetsApi;
use crate::config::Config;
use crate::error::GsheetError;
use crate::google_oauth::credentials::GoogleCredential;
use crate::service::csv_writer::{CsvOptions, render_table};
use crate::types::table::{RaggedPolicy, Table};
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written {
        path: PathBuf,
        rows: usize,
        columns: usize,
    },
    /// The range held no values; nothing was written.
    EmptyRange,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub csv: CsvOptions,
    pub ragged: RaggedPolicy,
}

impl From<&Config> for ExportOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            csv: CsvOptions {
                delimiter: cfg.delimiter_byte(),
                bom: cfg.export.bom,
            },
            ragged: cfg.export.ragged,
        }
    }
}

pub struct Exporter {
    http: reqwest::Client,
    api: SheetsApi,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(http: reqwest::Client, api: SheetsApi, options: ExportOptions) -> Self {
        Self { http, api, options }
    }

    /// Fetch `range` and write it to `output`, header line first.
    ///
    /// Nothing touches the filesystem unless the fetch succeeded and returned
    /// at least one row.
    pub async fn export(
        &self,
        credential: &GoogleCredential,
        spreadsheet_id: &str,
        range: &str,
        output: &Path,
    ) -> Result<ExportOutcome, GsheetError> {
        let token = credential.access_token()?;
        let value_range = self
            .api
            .get_values(&self.http, token, spreadsheet_id, range)
            .await?;

        if value_range.is_empty() {
            info!(spreadsheet_id, range, "no data found in range");
            return Ok(ExportOutcome::EmptyRange);
        }

        let Some(table) = Table::from_values(value_range.into_string_rows(), self.options.ragged)?
        else {
            return Ok(ExportOutcome::EmptyRange);
        };

        let bytes = render_table(&table, &self.options.csv)?;
        tokio::fs::write(output, bytes).await?;

        info!(
            path = %output.display(),
            rows = table.len(),
            columns = table.width(),
            "CSV file saved"
        );
        Ok(ExportOutcome::Written {
            path: output.to_path_buf(),
            rows: table.len(),
            columns: table.width(),
        })
    }
}
