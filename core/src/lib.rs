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

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod humanize;
pub mod lookup;
pub mod models;
pub mod summary;

// Re-export key items for convenience
pub use auth::OAuthClient;
pub use client::CreatesendClient;
pub use config::{Endpoints, OAuthConfig, Settings};
pub use error::{ErrorCause, ProviderError};
pub use lookup::{MembershipLookup, MembershipSource};
pub use models::{
    Account, ClientSummary, MailingList, MembershipRecord, Metadata, SubscriberState, Summary,
    TokenSet, CARD_ICON_URL,
};
pub use summary::Summarizer;
