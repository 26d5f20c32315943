//! Interactive consent: browser authorization with a loopback redirect.
//!
//! The flow sits behind [`ConsentFlow`] so the authenticator can be driven by
//! a scripted implementation in tests.

use crate::error::AuthError;
use crate::google_oauth::client_secrets::ClientSecrets;
use crate::google_oauth::credentials::GoogleCredential;
use crate::google_oauth::endpoints::GoogleOauthEndpoints;
use chrono::Utc;
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use url::Url;

/// Obtains a fresh credential through user interaction.
#[allow(async_fn_in_trait)]
pub trait ConsentFlow {
    async fn obtain_consent(
        &self,
        secrets: &ClientSecrets,
        scopes: &[String],
    ) -> Result<GoogleCredential, AuthError>;
}

/// Authorization-code flow with PKCE and a one-shot localhost listener.
pub struct LoopbackConsent {
    http: reqwest::Client,
    port: u16,
    timeout: Duration,
    open_browser: bool,
}

/// A bound callback listener together with the authorization URL pointing at it.
pub struct PendingConsent {
    listener: TcpListener,
    port: u16,
    redirect_uri: String,
    auth_url: Url,
    csrf_token: CsrfToken,
    verifier: PkceCodeVerifier,
}

impl PendingConsent {
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl LoopbackConsent {
    pub fn new(http: reqwest::Client, port: u16, timeout: Duration, open_browser: bool) -> Self {
        Self {
            http,
            port,
            timeout,
            open_browser,
        }
    }

    /// Bind the callback listener and build the authorization URL for it.
    pub async fn begin(
        &self,
        secrets: &ClientSecrets,
        scopes: &[String],
    ) -> Result<PendingConsent, AuthError> {
        let listener = TcpListener::bind(("127.0.0.1", self.port)).await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://localhost:{port}/");

        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) =
            GoogleOauthEndpoints::build_authorize_url(secrets, &redirect_uri, scopes, challenge)?;

        Ok(PendingConsent {
            listener,
            port,
            redirect_uri,
            auth_url,
            csrf_token,
            verifier,
        })
    }

    /// Wait for the redirect, check it, and exchange the code for tokens.
    pub async fn complete(
        &self,
        pending: PendingConsent,
        secrets: &ClientSecrets,
        scopes: &[String],
    ) -> Result<GoogleCredential, AuthError> {
        let PendingConsent {
            listener,
            redirect_uri,
            csrf_token,
            verifier,
            ..
        } = pending;

        let callback = tokio::time::timeout(
            self.timeout,
            accept_callback(&listener, csrf_token.secret()),
        )
        .await
        .map_err(|_| {
            AuthError::OauthFlow(format!(
                "timed out after {}s waiting for the OAuth callback",
                self.timeout.as_secs()
            ))
        })??;

        let (code, state) = match callback {
            CallbackParams::Code { code, state } => (code, state),
            CallbackParams::Denied { error } => return Err(AuthError::ConsentDenied(error)),
        };

        match state.as_deref() {
            Some(s) if s == csrf_token.secret().as_str() => {}
            Some(_) => return Err(AuthError::OauthFlow("CSRF token mismatch".to_string())),
            None => {
                return Err(AuthError::OauthFlow(
                    "missing `state` in callback".to_string(),
                ));
            }
        }

        let token_response = GoogleOauthEndpoints::exchange_authorization_code(
            secrets,
            &redirect_uri,
            AuthorizationCode::new(code),
            verifier,
            &self.http,
        )
        .await?;

        let credential =
            GoogleCredential::from_token_response(secrets, scopes, &token_response, Utc::now());
        if credential.refresh_token.is_none() {
            warn!(
                "OAuth response carried no refresh_token; the next run will need consent again"
            );
        }
        info!("Consent granted");
        Ok(credential)
    }
}

impl ConsentFlow for LoopbackConsent {
    async fn obtain_consent(
        &self,
        secrets: &ClientSecrets,
        scopes: &[String],
    ) -> Result<GoogleCredential, AuthError> {
        let pending = self.begin(secrets, scopes).await?;

        println!();
        println!("  Please visit this URL to authorize access to your spreadsheets:");
        println!("  {}", pending.auth_url());
        println!();
        if self.open_browser {
            open_url_in_browser(pending.auth_url().as_str());
        }
        info!(port = pending.port(), "Waiting for OAuth callback");

        self.complete(pending, secrets, scopes).await
    }
}
/// Query parameters Google appends to the redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackParams {
    Code { code: String, state: Option<String> },
    Denied { error: String },
}

/// Parse the request target of a callback (`/?code=...&state=...`).
/// Returns `None` for requests that are not an OAuth redirect.
pub fn parse_callback_target(target: &str) -> Option<CallbackParams> {
    let url = Url::parse("http://localhost").ok()?.join(target).ok()?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            "error" => error = Some(v.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Some(CallbackParams::Denied { error });
    }
    code.map(|code| CallbackParams::Code { code, state })
}

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>gsheet-csv</title></head>
<body style="font-family:system-ui;text-align:center;padding:60px">
<h2>The authentication flow has completed.</h2>
<p>You may close this window.</p>
</body></html>"#;

const DENIED_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>gsheet-csv</title></head>
<body style="font-family:system-ui;text-align:center;padding:60px">
<h2>Access was not granted.</h2>
<p>You may close this window.</p>
</body></html>"#;

/// Serve connections until one carries an OAuth redirect. The browser is told
/// the flow completed only when the redirect carries `expected_state`.
async fn accept_callback(
    listener: &TcpListener,
    expected_state: &str,
) -> Result<CallbackParams, AuthError> {
    loop {
        let (stream, addr) = listener.accept().await?;
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        if let Err(e) = reader.read_line(&mut request_line).await {
            debug!(%addr, error = %e, "dropping unreadable connection");
            continue;
        }
        let target = request_line
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_string();

        // Drain the headers so closing the socket does not reset the connection.
        let mut line = String::new();
        loop {
            match reader.read_line(&mut line).await {
                Ok(n) if n > 0 && !line.trim_end().is_empty() => line.clear(),
                Ok(_) => break,
                Err(e) => {
                    debug!(%addr, error = %e, "stopped reading request headers");
                    break;
                }
            }
        }

        let mut stream = reader.into_inner();
        match parse_callback_target(&target) {
            Some(params) => {
                let page = match &params {
                    CallbackParams::Code { state, .. }
                        if state.as_deref() == Some(expected_state) =>
                    {
                        SUCCESS_PAGE
                    }
                    _ => DENIED_PAGE,
                };
                write_response(&mut stream, "200 OK", page).await;
                return Ok(params);
            }
            None => {
                debug!(%addr, target = %target, "ignoring non-callback request");
                write_response(&mut stream, "404 Not Found", "").await;
            }
        }
    }
}

async fn write_response(stream: &mut tokio::net::TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        debug!(error = %e, "failed to answer callback request");
        return;
    }
    if let Err(e) = stream.flush().await {
        debug!(error = %e, "failed to flush callback response");
    }
}

/// Best-effort, non-blocking browser opener (platform-specific).
fn open_url_in_browser(url: &str) {
    #[cfg(target_os = "macos")]
    {
        let _ = std::process::Command::new("open").arg(url).spawn();
    }

    #[cfg(target_os = "linux")]
    {
        let _ = std::process::Command::new("xdg-open").arg(url).spawn();
    }

    #[cfg(target_os = "windows")]
    {
        let _ = std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn();
    }
}
