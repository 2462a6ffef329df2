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

//! "7 years ago" style relative timestamps.

use chrono::{DateTime, Utc};

/// Rendered when the reference timestamp could not be parsed.
pub const INVALID_DATE: &str = "Invalid date";

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

/// Formats `then` relative to `now`: "a few seconds ago", "a day ago",
/// "3 months ago", "in 2 hours".
pub fn relative_to(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(then) = then else {
        return INVALID_DATE.to_string();
    };

    let elapsed_ms = (now - then).num_milliseconds();
    let phrase = duration_phrase(elapsed_ms.unsigned_abs() as f64);

    if elapsed_ms >= 0 {
        format!("{} ago", phrase)
    } else {
        format!("in {}", phrase)
    }
}

/// Picks the coarsest unit that still reads naturally for an absolute span.
fn duration_phrase(ms: f64) -> String {
    let days_exact = ms / MS_PER_DAY;
    let months_exact = days_exact * 4800.0 / 146_097.0;

    let seconds = round_half_up(ms / MS_PER_SECOND);
    let minutes = round_half_up(ms / MS_PER_MINUTE);
    let hours = round_half_up(ms / MS_PER_HOUR);
    let days = round_half_up(days_exact);
    let months = round_half_up(months_exact);
    let years = round_half_up(months_exact / 12.0);

    if seconds <= 44 {
        "a few seconds".to_string()
    } else if minutes <= 1 {
        "a minute".to_string()
    } else if minutes < 45 {
        format!("{} minutes", minutes)
    } else if hours <= 1 {
        "an hour".to_string()
    } else if hours < 22 {
        format!("{} hours", hours)
    } else if days <= 1 {
        "a day".to_string()
    } else if days < 26 {
        format!("{} days", days)
    } else if months <= 1 {
        "a month".to_string()
    } else if months < 11 {
        format!("{} months", months)
    } else if years <= 1 {
        "a year".to_string()
    } else {
        format!("{} years", years)
    }
}

fn round_half_up(value: f64) -> u64 {
    (value + 0.5).floor() as u64
}
