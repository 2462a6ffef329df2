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

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Provider error body normalized to the OAuth `{error, error_description}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCause {
    pub error: String,
    pub error_description: String,
}

impl ErrorCause {
    /// Normalizes the two body shapes the API uses:
    /// `{"Code": 50, "Message": "..."}` for the REST API and
    /// `{"error": "...", "error_description": "..."}` for OAuth.
    /// Anything else is kept verbatim under `unknown`.
    pub fn from_body(body: &str) -> Option<Self> {
        let body = body.trim();
        if body.is_empty() {
            return None;
        }

        let unknown = || ErrorCause {
            error: "unknown".to_string(),
            error_description: body.to_string(),
        };

        let Ok(json) = serde_json::from_str::<Value>(body) else {
            return Some(unknown());
        };

        let pick = |code_key: &str, message_key: &str| -> Option<ErrorCause> {
            let code = json.get(code_key).and_then(scalar_to_string)?;
            let message = json.get(message_key).and_then(scalar_to_string)?;
            Some(ErrorCause {
                error: code,
                error_description: message,
            })
        };

        Some(
            pick("Code", "Message")
                .or_else(|| pick("error", "error_description"))
                .unwrap_or_else(unknown),
        )
    }
}

// `Code` is numeric on the REST API, `error` is a string on OAuth.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Campaign Monitor request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Campaign Monitor returned {status} {status_text}{}", describe_cause(.cause))]
    Http {
        status: u16,
        status_text: String,
        cause: Option<ErrorCause>,
    },
    #[error("Campaign Monitor: No access token returned for the given refresh token")]
    NoAccessToken,
    #[error("Campaign Monitor: no client found for this account")]
    NoClients,
    #[error("Unexpected Campaign Monitor response: {0}")]
    InvalidResponse(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

fn describe_cause(cause: &Option<ErrorCause>) -> String {
    match cause {
        Some(c) => format!(": {} ({})", c.error_description, c.error),
        None => String::new(),
    }
}

impl ProviderError {
    /// Builds a [`ProviderError::Http`] from a failed response's status line and body.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ProviderError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            cause: ErrorCause::from_body(body),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, for errors that came with a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            ProviderError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            ProviderError::Http { status_text, .. } if !status_text.is_empty() => {
                Some(status_text)
            }
            _ => None,
        }
    }

    pub fn cause(&self) -> Option<&ErrorCause> {
        match self {
            ProviderError::Http { cause, .. } => cause.as_ref(),
            _ => None,
        }
    }
}
