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

use crate::error::ProviderError;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.createsend.com/api/v3.1";
pub const DEFAULT_OAUTH_BASE: &str = "https://api.createsend.com/oauth";
pub const ACCOUNT_URL: &str = "https://login.createsend.com";

/// Permission requested during the OAuth flow.
pub const OAUTH_SCOPE: &str = "ManageLists";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the API and OAuth endpoints live. Overridable so tests can point at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_base: String,
    pub oauth_base: String,
    pub timeout: Duration,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            oauth_base: DEFAULT_OAUTH_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Endpoints {
    /// Every endpoint under one host, the way a mock server exposes them.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_base: format!("{}/api/v3.1", base),
            oauth_base: format!("{}/oauth", base),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.oauth_base.trim_end_matches('/'))
    }
}

/// Registered application credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// Runtime settings gathered from the environment.
///
/// Variables:
/// - `CREATESEND_CLIENT_ID`, `CREATESEND_CLIENT_SECRET`, `CREATESEND_REDIRECT_URI`: OAuth app.
/// - `CREATESEND_API_BASE`, `CREATESEND_OAUTH_BASE`: endpoint overrides.
/// - `CREATESEND_RECENCY_PREAMBLE`: `false` drops the "Added ... ago." prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoints: Endpoints,
    pub oauth: Option<OAuthConfig>,
    pub include_recency_preamble: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut endpoints = Endpoints::default();
        if let Some(api_base) = get("CREATESEND_API_BASE") {
            endpoints.api_base = api_base;
        }
        if let Some(oauth_base) = get("CREATESEND_OAUTH_BASE") {
            endpoints.oauth_base = oauth_base;
        }

        let oauth = match (
            get("CREATESEND_CLIENT_ID"),
            get("CREATESEND_CLIENT_SECRET"),
            get("CREATESEND_REDIRECT_URI"),
        ) {
            (Some(id), Some(secret), Some(redirect)) => Some(OAuthConfig::new(id, secret, redirect)),
            (None, None, None) => None,
            _ => {
                return Err(ProviderError::Config(
                    "CREATESEND_CLIENT_ID, CREATESEND_CLIENT_SECRET and CREATESEND_REDIRECT_URI must be set together"
                        .to_string(),
                ))
            }
        };

        let include_recency_preamble = match get("CREATESEND_RECENCY_PREAMBLE") {
            None => true,
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ProviderError::Config(format!("CREATESEND_RECENCY_PREAMBLE must be a boolean, got '{}'", v))
            })?,
        };

        Ok(Self {
            endpoints,
            oauth,
            include_recency_preamble,
        })
    }

    /// The OAuth app, or a configuration error naming what is missing.
    pub fn require_oauth(&self) -> Result<&OAuthConfig, ProviderError> {
        self.oauth.as_ref().ok_or_else(|| {
            ProviderError::Config(
                "Missing CREATESEND_CLIENT_ID, CREATESEND_CLIENT_SECRET or CREATESEND_REDIRECT_URI"
                    .to_string(),
            )
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ProviderError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.endpoints, Endpoints::default());
        assert_eq!(s.endpoints.token_url(), "https://api.createsend.com/oauth/token");
        assert!(s.oauth.is_none());
        assert!(s.include_recency_preamble);
        assert!(matches!(s.require_oauth(), Err(ProviderError::Config(_))));
    }

    #[test]
    fn test_full_configuration() {
        let s = settings(&[
            ("CREATESEND_CLIENT_ID", "123"),
            ("CREATESEND_CLIENT_SECRET", "secret"),
            ("CREATESEND_REDIRECT_URI", "https://example.com/callback"),
            ("CREATESEND_API_BASE", "http://localhost:9000/api/v3.1"),
            ("CREATESEND_RECENCY_PREAMBLE", "false"),
        ])
        .unwrap();

        let oauth = s.require_oauth().unwrap();
        assert_eq!(oauth.client_id, "123");
        assert_eq!(oauth.redirect_uri, "https://example.com/callback");
        assert_eq!(s.endpoints.api_base, "http://localhost:9000/api/v3.1");
        assert_eq!(s.endpoints.oauth_base, DEFAULT_OAUTH_BASE);
        assert!(!s.include_recency_preamble);
    }

    #[test]
    fn test_partial_oauth_is_rejected() {
        let err = settings(&[("CREATESEND_CLIENT_ID", "123")]).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn test_bad_boolean_is_rejected() {
        let err = settings(&[("CREATESEND_RECENCY_PREAMBLE", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_endpoints_with_base() {
        let e = Endpoints::with_base("http://127.0.0.1:4000/");
        assert_eq!(e.api_base, "http://127.0.0.1:4000/api/v3.1");
        assert_eq!(e.token_url(), "http://127.0.0.1:4000/oauth/token");
    }
}
