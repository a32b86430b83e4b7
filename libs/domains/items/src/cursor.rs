//! Keyset pagination cursors.
//!
//! A cursor is the RFC 3339 creation time of the last row on the previous
//! page, optionally followed by `|<id>`. The id breaks ties between rows
//! created in the same microsecond. Unparseable input is treated as "no
//! cursor" rather than an error.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::models::Item;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: Option<String>,
}

impl Cursor {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let (stamp, id) = match raw.split_once('|') {
            Some((stamp, id)) if !id.is_empty() => (stamp, Some(id.to_string())),
            Some((stamp, _)) => (stamp, None),
            None => (raw, None),
        };
        parse_timestamp(stamp).map(|created_at| Self { created_at, id })
    }

    pub fn after(item: &Item) -> Self {
        Self {
            created_at: item.created_at,
            id: Some(item.id.clone()),
        }
    }

    pub fn encode(&self) -> String {
        let stamp = self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true);
        match &self.id {
            Some(id) => format!("{stamp}|{id}"),
            None => stamp,
        }
    }

    /// True when `item` sorts strictly after the cursor in
    /// `created_at DESC, id DESC` order.
    pub fn admits(&self, item: &Item) -> bool {
        match &self.id {
            Some(id) => {
                item.created_at < self.created_at
                    || (item.created_at == self.created_at && item.id.as_str() < id.as_str())
            }
            None => item.created_at < self.created_at,
        }
    }
}

fn parse_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let stamp = stamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(stamp) {
        return Some(dt.with_timezone(&Utc));
    }
    // " " instead of "T", or no offset at all; both are read as UTC
    let normalized = stamp.trim_end_matches('Z').replacen(' ', "T", 1);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&format!("{normalized}Z")) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
