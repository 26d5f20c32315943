use super::client_secrets::ClientSecrets;
use super::consent::ConsentFlow;
use super::credentials::GoogleCredential;
use super::endpoints::GoogleOauthEndpoints;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::service::token_store::TokenStore;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Produces a usable credential: cached, refreshed, or newly consented.
pub struct Authenticator<C> {
    store: TokenStore,
    client_secrets: PathBuf,
    scopes: Vec<String>,
    http: reqwest::Client,
    consent: C,
}

impl<C: ConsentFlow> Authenticator<C> {
    pub fn new(cfg: &AuthConfig, http: reqwest::Client, consent: C) -> Self {
        Self {
            store: TokenStore::new(cfg.token_path.clone()),
            client_secrets: cfg.client_secrets.clone(),
            scopes: cfg.scopes.clone(),
            http,
            consent,
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Return the cached credential when still valid, refresh it when it has
    /// expired, and fall back to interactive consent otherwise. Every newly
    /// obtained credential is written back to the token file.
    pub async fn load_or_refresh(&self) -> Result<GoogleCredential, AuthError> {
        if let Some(cached) = self.store.load().await?
            && let Some(cred) = self.reuse_or_refresh(cached).await?
        {
            return Ok(cred);
        }

        let secrets = ClientSecrets::from_file(&self.client_secrets)?;
        info!(
            client_secrets = %self.client_secrets.display(),
            "starting interactive consent"
        );
        let cred = self.consent.obtain_consent(&secrets, &self.scopes).await?;
        self.store.save(&cred).await?;
        Ok(cred)
    }

    /// `Ok(None)` means the cached credential cannot be used and consent is needed.
    async fn reuse_or_refresh(
        &self,
        mut cred: GoogleCredential,
    ) -> Result<Option<GoogleCredential>, AuthError> {
        if !cred.covers_scopes(&self.scopes) {
            warn!(
                granted = ?cred.scopes,
                requested = ?self.scopes,
                "cached credential lacks requested scopes"
            );
            return Ok(None);
        }

        if cred.is_valid_at(Utc::now()) {
            debug!("using cached credential");
            return Ok(Some(cred));
        }

        if cred.refresh_token.is_none() {
            info!("cached credential expired and has no refresh token");
            return Ok(None);
        }

        match GoogleOauthEndpoints::refresh_access_token(&cred, &self.http).await {
            Ok(resp) => {
                cred.apply_token_response(&resp, Utc::now());
                self.store.save(&cred).await?;
                Ok(Some(cred))
            }
            Err(e) if e.is_revoked_grant() => {
                warn!(error = %e, "refresh token was rejected; consent is required");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
