use crate::config::BasicConfig;
use crate::error::GsheetError;
use std::time::Duration;

/// One client for both the token endpoint and the Sheets API.
pub fn build_http_client(cfg: &BasicConfig) -> Result<reqwest::Client, GsheetError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("gsheet-csv/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        // Token endpoints must not be followed through redirects.
        .redirect(reqwest::redirect::Policy::none());

    if let Some(proxy_url) = cfg.proxy.as_ref() {
        let proxy = reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| {
            GsheetError::InvalidConfig(format!("invalid proxy url {proxy_url}: {e}"))
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| GsheetError::InvalidConfig(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn builds_with_and_without_proxy() {
        let mut cfg = BasicConfig::default();
        assert!(build_http_client(&cfg).is_ok());

        cfg.proxy = Some(Url::parse("http://127.0.0.1:3128").unwrap());
        assert!(build_http_client(&cfg).is_ok());
    }
}
