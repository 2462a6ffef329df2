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

use crate::humanize;
use crate::models::{MembershipRecord, SubscriberState, Summary};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Shown when the address is not on any list of the account.
pub const NOT_IN_ANY_LIST: &str = "Not in any list.";

/// How many list names are spelled out per state group.
const NAMES_PER_GROUP: usize = 2;

/// Turns the memberships of one email address into a single card line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summarizer {
    /// Prefix the card with "Added <relative time>. " using the oldest membership.
    pub include_recency_preamble: bool,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self {
            include_recency_preamble: true,
        }
    }
}

impl Summarizer {
    pub fn new(include_recency_preamble: bool) -> Self {
        Self {
            include_recency_preamble,
        }
    }

    /// Builds the card text, e.g.
    /// `Added 7 years ago. _Subscribed to_ List 5, List 1 and 2 more. _Deleted from_ List 3. `
    ///
    /// Groups follow [`SubscriberState::PRIORITY`]; records in an unknown state are
    /// left out of every group. `now` is only used for the recency preamble.
    pub fn summarize(&self, records: &[MembershipRecord], now: DateTime<Utc>) -> Summary {
        if records.is_empty() {
            return Summary::new(NOT_IN_ANY_LIST);
        }

        let mut text = String::new();

        if self.include_recency_preamble {
            let earliest = records.iter().filter_map(MembershipRecord::added_at).min();
            text.push_str(&format!("Added {}. ", humanize::relative_to(earliest, now)));
        }

        for state in SubscriberState::PRIORITY {
            let Some(label) = state.label() else {
                continue;
            };

            let mut members: Vec<(Option<DateTime<Utc>>, &MembershipRecord)> = records
                .iter()
                .filter(|m| m.subscriber_state == state)
                .map(|m| (m.added_at(), m))
                .collect();

            if members.is_empty() {
                continue;
            }

            // Stable: equal dates keep their input order.
            members.sort_by(|a, b| compare_added(a.0, b.0));

            let names = members
                .iter()
                .take(NAMES_PER_GROUP)
                .map(|(_, m)| m.list_name.as_str())
                .collect::<Vec<&str>>()
                .join(", ");

            text.push('_');
            text.push_str(label);
            text.push_str("_ ");
            text.push_str(&names);

            if members.len() > NAMES_PER_GROUP {
                text.push_str(&format!(
                    " and {} more. ",
                    members.len() - NAMES_PER_GROUP
                ));
            } else {
                text.push_str(". ");
            }
        }

        Summary::new(text)
    }
}

/// Oldest first; unparseable dates go after every real one.
fn compare_added(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CARD_ICON_URL;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn record(name: &str, state: SubscriberState, date: &str) -> MembershipRecord {
        MembershipRecord::new(name, state, date)
    }

    fn fixture() -> Vec<MembershipRecord> {
        let json = r#"[
            {"ListID": "1", "ListName": "List 1", "SubscriberState": "Active", "DateSubscriberAdded": "2017-09-10 10:00:00"},
            {"ListID": "2", "ListName": "List 2", "SubscriberState": "Unsubscribed", "DateSubscriberAdded": "2018-01-01 08:00:00"},
            {"ListID": "3", "ListName": "List 3", "SubscriberState": "Deleted", "DateSubscriberAdded": "2019-03-03 15:45:00"},
            {"ListID": "4", "ListName": "List 4", "SubscriberState": "Unconfirmed", "DateSubscriberAdded": "2020-02-02 02:02:00"},
            {"ListID": "5", "ListName": "List 5", "SubscriberState": "Active", "DateSubscriberAdded": "2017-06-01 09:00:00"},
            {"ListID": "6", "ListName": "List 6", "SubscriberState": "Active", "DateSubscriberAdded": "2021-01-01 00:00:00"},
            {"ListID": "7", "ListName": "List 7", "SubscriberState": "Active", "DateSubscriberAdded": "2022-01-01 00:00:00"}
        ]"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_memberships() {
        let summary = Summarizer::default().summarize(&[], now());
        assert_eq!(summary.icon, CARD_ICON_URL);
        assert_eq!(summary.text, "Not in any list.");

        let summary = Summarizer::new(false).summarize(&[], now());
        assert_eq!(summary.text, "Not in any list.");
    }

    #[test]
    fn test_reference_fixture() {
        let summary = Summarizer::default().summarize(&fixture(), now());
        assert_eq!(
            summary.icon,
            "https://storage.googleapis.com/senders-images/cards/campaignmonitor.png"
        );
        assert_eq!(
            summary.text,
            "Added 7 years ago. _Subscribed to_ List 5, List 1 and 2 more. _Unsubscribed from_ List 2. _Pending for_ List 4. _Deleted from_ List 3. "
        );
    }

    #[test]
    fn test_without_recency_preamble() {
        let summary = Summarizer::new(false).summarize(&fixture(), now());
        assert_eq!(
            summary.text,
            "_Subscribed to_ List 5, List 1 and 2 more. _Unsubscribed from_ List 2. _Pending for_ List 4. _Deleted from_ List 3. "
        );
    }

    #[test]
    fn test_groups_follow_state_priority_regardless_of_input_order() {
        let records = vec![
            record("D", SubscriberState::Deleted, "2020-01-01 00:00:00"),
            record("B", SubscriberState::Bounced, "2020-01-01 00:00:00"),
            record("C", SubscriberState::Unconfirmed, "2020-01-01 00:00:00"),
            record("U", SubscriberState::Unsubscribed, "2020-01-01 00:00:00"),
            record("A", SubscriberState::Active, "2020-01-01 00:00:00"),
        ];

        let summary = Summarizer::new(false).summarize(&records, now());
        assert_eq!(
            summary.text,
            "_Subscribed to_ A. _Unsubscribed from_ U. _Pending for_ C. _Bounced from_ B. _Deleted from_ D. "
        );
    }

    #[test]
    fn test_group_truncation() {
        let two = vec![
            record("First", SubscriberState::Bounced, "2020-01-01 00:00:00"),
            record("Second", SubscriberState::Bounced, "2020-02-01 00:00:00"),
        ];
        assert_eq!(
            Summarizer::new(false).summarize(&two, now()).text,
            "_Bounced from_ First, Second. "
        );

        let mut five = two.clone();
        five.push(record("Third", SubscriberState::Bounced, "2020-03-01 00:00:00"));
        five.push(record("Fourth", SubscriberState::Bounced, "2020-04-01 00:00:00"));
        five.push(record("Fifth", SubscriberState::Bounced, "2020-05-01 00:00:00"));
        assert_eq!(
            Summarizer::new(false).summarize(&five, now()).text,
            "_Bounced from_ First, Second and 3 more. "
        );
    }

    #[test]
    fn test_oldest_memberships_are_named_first() {
        let records = vec![
            record("Newest", SubscriberState::Active, "2023-01-01 00:00:00"),
            record("Middle", SubscriberState::Active, "2021-01-01 00:00:00"),
            record("Oldest", SubscriberState::Active, "2019-01-01 00:00:00"),
        ];
        assert_eq!(
            Summarizer::new(false).summarize(&records, now()).text,
            "_Subscribed to_ Oldest, Middle and 1 more. "
        );
    }

    #[test]
    fn test_equal_dates_keep_input_order() {
        let records = vec![
            record("Zeta", SubscriberState::Active, "2020-01-01 00:00:00"),
            record("Alpha", SubscriberState::Active, "2020-01-01 00:00:00"),
            record("Beta", SubscriberState::Active, "2020-01-01 00:00:00"),
        ];
        assert_eq!(
            Summarizer::new(false).summarize(&records, now()).text,
            "_Subscribed to_ Zeta, Alpha and 1 more. "
        );
    }

    #[test]
    fn test_unrecognized_states_are_left_out() {
        let records = vec![
            record("Hidden", SubscriberState::Unrecognized, "2010-01-01 00:00:00"),
            record("Visible", SubscriberState::Active, "2023-06-01 12:00:00"),
        ];

        let summary = Summarizer::default().summarize(&records, now());
        // The unknown record still counts for the oldest date.
        assert_eq!(summary.text, "Added 14 years ago. _Subscribed to_ Visible. ");
        assert!(!summary.text.contains("Hidden"));
    }

    #[test]
    fn test_only_unrecognized_states() {
        let records = vec![record("Hidden", SubscriberState::Unrecognized, "2024-05-31 12:00:00")];

        assert_eq!(
            Summarizer::default().summarize(&records, now()).text,
            "Added a day ago. "
        );
        assert_eq!(Summarizer::new(false).summarize(&records, now()).text, "");
    }

    #[test]
    fn test_malformed_dates_do_not_fail() {
        let records = vec![
            record("Broken", SubscriberState::Active, "not a date"),
            record("Fine", SubscriberState::Active, "2024-03-01 12:00:00"),
        ];
        assert_eq!(
            Summarizer::default().summarize(&records, now()).text,
            "Added 3 months ago. _Subscribed to_ Fine, Broken. "
        );

        let all_broken = vec![record("Broken", SubscriberState::Deleted, "")];
        assert_eq!(
            Summarizer::default().summarize(&all_broken, now()).text,
            "Added Invalid date. _Deleted from_ Broken. "
        );
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let summarizer = Summarizer::default();
        let first = summarizer.summarize(&fixture(), now());
        let second = summarizer.summarize(&fixture(), now());
        assert_eq!(first, second);
    }
}
