use crate::config::GOOGLE_AUTH_URL;
use crate::error::AuthError;
use crate::google_oauth::client_secrets::ClientSecrets;
use crate::google_oauth::credentials::GoogleCredential;

use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret,
    CsrfToken, EndpointNotSet, EndpointSet, ExtraTokenFields, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, RefreshToken, Scope, StandardRevocableToken,
    StandardTokenResponse, TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenType,
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

/// Stateless Google OAuth Endpoints.
pub struct GoogleOauthEndpoints;

impl GoogleOauthEndpoints {
    /// Refresh the access token using the credential's refresh token.
    pub async fn refresh_access_token(
        creds: &GoogleCredential,
        http_client: &reqwest::Client,
    ) -> Result<GoogleTokenResponse, AuthError> {
        let refresh_token = creds.refresh_token.as_deref().ok_or_else(|| {
            AuthError::OauthFlow("credential has no refresh token".to_string())
        })?;
        let client = build_oauth2_client(
            &creds.client_id,
            &creds.client_secret,
            GOOGLE_AUTH_URL,
            &creds.token_uri,
        )?;
        let token_result: GoogleTokenResponse = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(http_client)
            .await?;
        info!(client_id = %creds.client_id, "Access token refreshed successfully");
        Ok(token_result)
    }

    /// Authorization URL for the consent page, with PKCE and offline access.
    pub fn build_authorize_url(
        secrets: &ClientSecrets,
        redirect_uri: &str,
        scopes: &[String],
        challenge: PkceCodeChallenge,
    ) -> Result<(Url, CsrfToken), AuthError> {
        let client = build_oauth2_client(
            &secrets.client_id,
            &secrets.client_secret,
            &secrets.auth_uri,
            &secrets.token_uri,
        )?
        .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string())?);

        Ok(client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .set_pkce_challenge(challenge)
            .url())
    }

    /// Exchange the authorization code received on the redirect for tokens.
    pub async fn exchange_authorization_code(
        secrets: &ClientSecrets,
        redirect_uri: &str,
        code: AuthorizationCode,
        verifier: PkceCodeVerifier,
        http_client: &reqwest::Client,
    ) -> Result<GoogleTokenResponse, AuthError> {
        let client = build_oauth2_client(
            &secrets.client_id,
            &secrets.client_secret,
            &secrets.auth_uri,
            &secrets.token_uri,
        )?
        .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string())?);

        let token_result: GoogleTokenResponse = client
            .exchange_code(code)
            .set_pkce_verifier(verifier)
            .request_async(http_client)
            .await?;
        info!(client_id = %secrets.client_id, "Authorization code exchanged successfully");
        Ok(token_result)
    }
}

/// Build the Google OAuth2 client. Client credentials travel in the request
/// body, as the Google client libraries send them.
fn build_oauth2_client(
    client_id: &str,
    client_secret: &str,
    auth_uri: &str,
    token_uri: &str,
) -> Result<GoogleOauth2Client, AuthError> {
    let client = OAuth2Client::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_type(AuthType::RequestBody)
        .set_auth_uri(AuthUrl::new(auth_uri.to_string())?)
        .set_token_uri(TokenUrl::new(token_uri.to_string())?);
    Ok(client)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleTokenField {
    #[serde(rename = "id_token")]
    pub id_token: Option<String>,
}
impl ExtraTokenFields for GoogleTokenField {}

pub type GoogleTokenResponse = StandardTokenResponse<GoogleTokenField, BasicTokenType>;

pub(super) type GoogleOauth2Client = OAuth2Client<
    BasicErrorResponse,
    GoogleTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;
