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

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Brand icon shown on every card and in the catalog.
pub const CARD_ICON_URL: &str =
    "https://storage.googleapis.com/senders-images/cards/campaignmonitor.png";

/// Lifecycle stage of a contact on one mailing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriberState {
    Active,
    Unsubscribed,
    Unconfirmed,
    Bounced,
    Deleted,
    /// Any state the provider sends that we do not know about.
    #[serde(other)]
    Unrecognized,
}

impl SubscriberState {
    /// Display order of the groups on a card.
    pub const PRIORITY: [SubscriberState; 5] = [
        SubscriberState::Active,
        SubscriberState::Unsubscribed,
        SubscriberState::Unconfirmed,
        SubscriberState::Bounced,
        SubscriberState::Deleted,
    ];

    pub fn label(&self) -> Option<&'static str> {
        match self {
            SubscriberState::Active => Some("Subscribed to"),
            SubscriberState::Unsubscribed => Some("Unsubscribed from"),
            SubscriberState::Unconfirmed => Some("Pending for"),
            SubscriberState::Bounced => Some("Bounced from"),
            SubscriberState::Deleted => Some("Deleted from"),
            SubscriberState::Unrecognized => None,
        }
    }
}

/// One (list, subscriber) pairing as returned by `listsforemail.json`.
///
/// ```json
/// {
///   "ListID": "a58ee1d3039b8bec838e6d1482a8a965",
///   "ListName": "List One",
///   "SubscriberState": "Active",
///   "DateSubscriberAdded": "2010-03-19 11:15:00"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    #[serde(rename = "ListID", default)]
    pub list_id: String,
    #[serde(rename = "ListName")]
    pub list_name: String,
    #[serde(rename = "SubscriberState")]
    pub subscriber_state: SubscriberState,
    #[serde(rename = "DateSubscriberAdded", default)]
    pub date_added: String, // Raw provider value, parsed on demand
}

impl MembershipRecord {
    pub fn new(
        list_name: impl Into<String>,
        subscriber_state: SubscriberState,
        date_added: impl Into<String>,
    ) -> Self {
        Self {
            list_id: String::new(),
            list_name: list_name.into(),
            subscriber_state,
            date_added: date_added.into(),
        }
    }

    /// Parsed `DateSubscriberAdded`, or `None` when the provider sent garbage.
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        parse_provider_date(&self.date_added)
    }
}

/// Parses the timestamp formats the API is known to emit.
///
/// Values without an offset are taken as UTC.
pub fn parse_provider_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The `{icon, text}` card payload rendered by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub icon: String,
    pub text: String,
}

impl Summary {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            icon: CARD_ICON_URL.to_string(),
            text: text.into(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Static descriptor used by the integrations catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub icon: String,
    pub title: String,
    pub description: String,
}

impl Metadata {
    pub fn campaign_monitor() -> Self {
        Self {
            icon: CARD_ICON_URL.to_string(),
            title: "Campaign Monitor".to_string(),
            description: "See if the sender is subscribed to any of your Campaign Monitor lists."
                .to_string(),
        }
    }
}

/// Tokens obtained from the authorization code or refresh exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_on: DateTime<Utc>,
}

impl TokenSet {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_on: now + Duration::seconds(expires_in_secs),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_on
    }
}

/// A client (tenant) of the Campaign Monitor account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    #[serde(rename = "ClientID")]
    pub client_id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// A mailing list owned by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailingList {
    #[serde(rename = "ListID")]
    pub list_id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// What the host platform shows for a connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub login_name: String,
    pub account_url: String,
}
