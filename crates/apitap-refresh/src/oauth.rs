//! OAuth refresh (spec §4.6 step 1): form-encoded POST to `tokenEndpoint`,
//! either `refresh_token` or `client_credentials` grant.
//!
//! A typestate `BasicClient<EndpointSet, ...>` builder (the `oauth2` crate)
//! models the full authorization-code/PKCE flow; this orchestrator only
//! ever needs two grant types with no redirect step, so it talks to the
//! token endpoint directly via `reqwest::Client::form` instead (documented
//! as a dropped dependency in DESIGN.md).

use apitap_core::error::ApitapError;
use apitap_skillfile::{OAuthConfig, OAuthGrantType};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

pub struct OAuthRefreshResult {
    pub access_token: SecretString,
    /// Present when the server rotated the refresh token (refresh-token
    /// rotation is assumed per spec §4.6 step 1).
    pub rotated_refresh_token: Option<SecretString>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn refresh(
    client: &Client,
    config: &OAuthConfig,
    refresh_token: Option<&SecretString>,
    client_secret: Option<&SecretString>,
) -> Result<OAuthRefreshResult, ApitapError> {
    let mut form: Vec<(&str, &str)> = vec![("client_id", config.client_id.as_str())];

    match config.grant_type {
        OAuthGrantType::RefreshToken => {
            let token = refresh_token
                .ok_or_else(|| ApitapError::authentication(&config.token_endpoint, "no stored refresh_token to use"))?;
            form.push(("grant_type", "refresh_token"));
            form.push(("refresh_token", token.expose_secret()));
        }
        OAuthGrantType::ClientCredentials => {
            let secret = client_secret
                .ok_or_else(|| ApitapError::authentication(&config.token_endpoint, "no stored client_secret to use"))?;
            form.push(("grant_type", "client_credentials"));
            form.push(("client_secret", secret.expose_secret()));
        }
    }
    if let Some(scope) = &config.scope {
        form.push(("scope", scope.as_str()));
    }

    let response = client
        .post(&config.token_endpoint)
        .form(&form)
        .send()
        .await
        .map_err(|e| ApitapError::transient(format!("oauth refresh request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(ApitapError::authentication(
            &config.token_endpoint,
            format!("token endpoint returned {status}"),
        ));
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| ApitapError::transient(format!("malformed token response: {e}")))?;

    let expires_at = body
        .expires_in
        .map(|secs| apitap_core::time::now() + chrono::Duration::seconds(secs));

    Ok(OAuthRefreshResult {
        access_token: SecretString::from(body.access_token),
        rotated_refresh_token: body.refresh_token.map(SecretString::from),
        expires_at,
    })
}
