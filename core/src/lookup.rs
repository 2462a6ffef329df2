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

use crate::config::ACCOUNT_URL;
use crate::error::ProviderError;
use crate::models::{Account, ClientSummary, MembershipRecord, Summary};
use crate::summary::Summarizer;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;

/// Where membership records come from.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    /// The client whose lists are searched.
    async fn default_client(&self) -> Result<ClientSummary, ProviderError>;

    /// Memberships of `email` across every list of `client`.
    async fn memberships(
        &self,
        client: &ClientSummary,
        email: &str,
    ) -> Result<Vec<MembershipRecord>, ProviderError>;
}

/// Answers "is this sender on any of my lists" for the host platform.
pub struct MembershipLookup<S> {
    source: Arc<S>,
    summarizer: Summarizer,
}

impl<S> Clone for MembershipLookup<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            summarizer: self.summarizer,
        }
    }
}

impl<S: MembershipSource> MembershipLookup<S> {
    pub fn new(source: S, summarizer: Summarizer) -> Self {
        Self {
            source: Arc::new(source),
            summarizer,
        }
    }

    /// Login name and console URL of the connected account.
    pub async fn account(&self) -> Result<Account, ProviderError> {
        let client = self.source.default_client().await?;
        Ok(Account {
            login_name: client.name,
            account_url: ACCOUNT_URL.to_string(),
        })
    }

    /// Raw memberships of `email` in the default client.
    pub async fn memberships(&self, email: &str) -> Result<Vec<MembershipRecord>, ProviderError> {
        let client = self.source.default_client().await?;
        self.source.memberships(&client, email).await
    }

    /// The card for `email`, with relative dates computed against `now`.
    pub async fn fetch(&self, email: &str, now: DateTime<Utc>) -> Result<Summary, ProviderError> {
        let memberships = self.memberships(email).await?;
        info!("Found {} memberships", memberships.len());
        Ok(self.summarizer.summarize(&memberships, now))
    }
}
