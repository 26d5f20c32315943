use crate::error::{FetchError, GoogleApiError};
use crate::types::value_range::ValueRange;
use tracing::debug;
use url::Url;

/// Thin client for `spreadsheets.values.get`.
#[derive(Debug, Clone)]
pub struct SheetsApi {
    base_url: Url,
}

impl SheetsApi {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}`, with the range encoded as
    /// a single path segment.
    pub fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        Ok(url)
    }

    pub async fn get_values(
        &self,
        client: &reqwest::Client,
        token: impl AsRef<str>,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, FetchError> {
        let url = self.values_url(spreadsheet_id, range)?;
        debug!(%url, "requesting sheet values");

        let resp = client
            .get(url)
            .bearer_auth(token.as_ref())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(GoogleApiError::into_fetch_error(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Accept either a bare spreadsheet id or a full sheet URL
/// (`https://docs.google.com/spreadsheets/d/<id>/edit#gid=0`).
pub fn spreadsheet_id_from(input: &str) -> String {
    let trimmed = input.trim();
    if let Ok(url) = Url::parse(trimmed)
        && let Some(mut segments) = url.path_segments()
        && segments.any(|s| s == "d")
        && let Some(id) = segments.next().filter(|s| !s.is_empty())
    {
        return id.to_string();
    }
    trimmed.to_string()
}
