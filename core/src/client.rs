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

use crate::config::Endpoints;
use crate::error::ProviderError;
use crate::lookup::MembershipSource;
use crate::models::{ClientSummary, MailingList, MembershipRecord};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;

/// Authenticated session against the Campaign Monitor REST API.
///
/// Base URL and bearer token are fixed at construction; nothing is shared between
/// sessions, so separate tokens never see each other's settings.
#[derive(Debug, Clone)]
pub struct CreatesendClient {
    http: reqwest::Client,
    api_base: String,
}

impl CreatesendClient {
    pub fn new(access_token: &str, endpoints: &Endpoints) -> Result<Self, ProviderError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|_| ProviderError::Config("access token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(endpoints.timeout)
            .build()?;

        Ok(Self {
            http,
            api_base: endpoints.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// All clients of the account behind the token.
    pub async fn clients(&self) -> Result<Vec<ClientSummary>, ProviderError> {
        self.get("/clients.json", &[]).await
    }

    /// The first client of the account.
    ///
    /// Accounts with several clients only ever expose the first one.
    pub async fn first_client(&self) -> Result<ClientSummary, ProviderError> {
        self.clients()
            .await?
            .into_iter()
            .next()
            .ok_or(ProviderError::NoClients)
    }

    pub async fn lists(&self, client_id: &str) -> Result<Vec<MailingList>, ProviderError> {
        self.get(&format!("/clients/{}/lists.json", client_id), &[])
            .await
    }

    /// Every list of the client the address is (or was) on.
    pub async fn lists_for_email(
        &self,
        client_id: &str,
        email: &str,
    ) -> Result<Vec<MembershipRecord>, ProviderError> {
        self.get(
            &format!("/clients/{}/listsforemail.json", client_id),
            &[("email", email)],
        )
        .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.api_base, path);
        debug!("GET {}", url);

        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::from_status(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl MembershipSource for CreatesendClient {
    async fn default_client(&self) -> Result<ClientSummary, ProviderError> {
        self.first_client().await
    }

    async fn memberships(
        &self,
        client: &ClientSummary,
        email: &str,
    ) -> Result<Vec<MembershipRecord>, ProviderError> {
        let (lists, memberships) = futures::try_join!(
            self.lists(&client.client_id),
            self.lists_for_email(&client.client_id, email)
        )?;

        // Lists are not part of the card yet.
        debug!(
            "Client '{}' has {} lists, address is on {}",
            client.name,
            lists.len(),
            memberships.len()
        );

        Ok(memberships)
    }
}
