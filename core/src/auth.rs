/*
    createsend-card-rs | Campaign Monitor membership cards for contact lookups.
    Copyright (C) 2025  Israel Alberto Roldan Vega

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::config::{Endpoints, OAuthConfig, OAUTH_SCOPE};
use crate::error::ProviderError;
use crate::models::TokenSet;
use chrono::Utc;
use log::{debug, info};
use serde::Deserialize;
use url::Url;

/// Raw `/oauth/token` response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

/// Campaign Monitor OAuth (web server flow).
///
/// Holds the registered application and one HTTP client, so a single instance can be
/// shared between requests.
pub struct OAuthClient {
    config: OAuthConfig,
    endpoints: Endpoints,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig, endpoints: Endpoints) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(endpoints.timeout)
            .build()?;

        Ok(Self {
            config,
            endpoints,
            http,
        })
    }

    /// URL the browser is sent to in order to start the flow.
    ///
    /// `state` comes back untouched on the redirect and should be checked by the caller.
    pub fn authorize_url(&self, state: &str) -> Result<Url, ProviderError> {
        let url = Url::parse_with_params(
            &self.endpoints.oauth_base,
            &[
                ("type", "web_server"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", OAUTH_SCOPE),
                ("state", state),
            ],
        )?;
        Ok(url)
    }

    /// Trades the authorization code from the redirect for a token set.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, ProviderError> {
        debug!("Exchanging authorization code for tokens");

        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;

        let access_token = response.access_token.ok_or_else(|| {
            ProviderError::InvalidResponse("token response has no access_token".to_string())
        })?;

        info!("Obtained Campaign Monitor tokens");
        Ok(TokenSet::new(
            access_token,
            response.refresh_token,
            response.expires_in,
            Utc::now(),
        ))
    }

    /// Gets a fresh access token. Fails with [`ProviderError::NoAccessToken`] when the
    /// provider answers without one.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, ProviderError> {
        debug!("Refreshing access token");

        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        let access_token = response.access_token.ok_or(ProviderError::NoAccessToken)?;

        info!("Refreshed Campaign Monitor access token");
        Ok(TokenSet::new(
            access_token,
            response.refresh_token,
            response.expires_in,
            Utc::now(),
        ))
    }

    // The token endpoint takes its parameters in the query string, not a form body.
    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, ProviderError> {
        let response = self
            .http
            .post(self.endpoints.token_url())
            .query(params)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::from_status(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("token response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        OAuthClient::new(
            OAuthConfig::new("104167", "s3cr3t", "https://senders.example.com/oauth/callback"),
            Endpoints::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_authorize_url() {
        let url = client().authorize_url("user-42").unwrap();

        assert_eq!(url.host_str(), Some("api.createsend.com"));
        assert_eq!(url.path(), "/oauth");

        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("type".to_string(), "web_server".to_string()),
                ("client_id".to_string(), "104167".to_string()),
                (
                    "redirect_uri".to_string(),
                    "https://senders.example.com/oauth/callback".to_string()
                ),
                ("scope".to_string(), "ManageLists".to_string()),
                ("state".to_string(), "user-42".to_string()),
            ]
        );
    }

    #[test]
    fn test_authorize_url_encodes_state() {
        let url = client().authorize_url("a b&c").unwrap();
        assert!(url.as_str().ends_with("state=a+b%26c"));
    }

    #[test]
    fn test_invalid_oauth_base() {
        let endpoints = Endpoints {
            oauth_base: "not a url".to_string(),
            ..Endpoints::default()
        };
        let client = OAuthClient::new(OAuthConfig::new("1", "2", "3"), endpoints).unwrap();
        assert!(matches!(client.authorize_url("x"), Err(ProviderError::Url(_))));
    }
}
