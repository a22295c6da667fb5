use crate::domain::model::AccessToken;
use crate::utils::error::{RateError, Result};
use reqwest::Client;
use serde::Deserialize;

pub const TOKEN_PATH: &str = "/oauth/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Client-credentials grant. Every failure (transport, status, body)
/// comes back as [`RateError::Auth`]; nothing is retried.
pub async fn request_token(
    http: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<AccessToken> {
    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ];

    tracing::debug!("Requesting access token from {}", token_url);
    let response = http
        .post(token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| RateError::auth(format!("OAuth error: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RateError::auth(format!("OAuth error: HTTP {}", status)));
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| RateError::auth(format!("OAuth error: unreadable token response: {}", e)))?;

    match body.access_token.filter(|t| !t.trim().is_empty()) {
        Some(token) => {
            if let Some(expires_in) = body.expires_in {
                tracing::debug!("Access token valid for {}s", expires_in);
            }
            Ok(AccessToken::new(token))
        }
        None => Err(RateError::auth("OAuth error: response has no access_token")),
    }
}
