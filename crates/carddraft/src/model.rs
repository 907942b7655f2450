//! # Domain Model: Drafts
//!
//! A [`Draft`] is the snapshot of one template's in-progress form: the field values in slot
//! order, the tags, and the time of the last write. Drafts are keyed by template identity
//! (the template's name, e.g. `"Basic"` or `"Cloze"`), one per key.
//!
//! ## Wire Format
//!
//! On disk each draft is a [`DraftRecord`] stored under its template key:
//!
//! ```text
//! {
//!   "Basic": { "last_saved": 1710000000.25, "fields": ["Q", "A"], "tags": ["math"] }
//! }
//! ```
//!
//! The key lives outside the record, so [`Draft`] carries it separately and converts with
//! [`Draft::from_record`] / [`Draft::to_record`]. All three record attributes are required;
//! a record missing any of them does not deserialize and is treated as an invalid entry by the
//! store.
//!
//! ## Timestamps
//!
//! Timestamps are fractional seconds since the Unix epoch (`f64`). Staleness is judged as
//! `now - saved_at > max_age`; a draft stamped in the future (clock moved backwards) counts
//! as fresh.
//!
//! ## Positional Restore
//!
//! Fields are restored by position only. When a template's shape changed between save and
//! restore, [`map_fields_positionally`] truncates extra stored values and pads missing slots
//! with empty strings. No attempt is made to match fields by name.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Serialized shape of a single draft entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub last_saved: f64,
    pub fields: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub template_key: String,
    pub saved_at: f64,
    pub fields: Vec<String>,
    pub tags: Vec<String>,
}

impl Draft {
    pub fn new(template_key: &str, fields: Vec<String>, tags: Vec<String>, now: f64) -> Self {
        Self {
            template_key: template_key.to_string(),
            saved_at: now,
            fields,
            tags: normalize_tags(tags),
        }
    }

    pub fn from_record(template_key: &str, record: DraftRecord) -> Self {
        Self {
            template_key: template_key.to_string(),
            saved_at: record.last_saved,
            fields: record.fields,
            tags: normalize_tags(record.tags),
        }
    }

    pub fn to_record(&self) -> DraftRecord {
        DraftRecord {
            last_saved: self.saved_at,
            fields: self.fields.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Seconds elapsed between the save and `now`. Negative if saved in the future.
    pub fn age_seconds(&self, now: f64) -> f64 {
        now - self.saved_at
    }

    pub fn is_stale(&self, max_age_seconds: f64, now: f64) -> bool {
        self.age_seconds(now) > max_age_seconds
    }

    /// Save time as a calendar timestamp, for log output.
    pub fn saved_at_utc(&self) -> Option<DateTime<Utc>> {
        let secs = self.saved_at.floor();
        let nanos = ((self.saved_at - secs) * 1e9) as u32;
        Utc.timestamp_opt(secs as i64, nanos).single()
    }
}

/// Current time as fractional seconds since the Unix epoch.
pub fn now_timestamp() -> f64 {
    timestamp_from(Utc::now())
}

pub fn timestamp_from(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}

/// Deduplicates tags, keeping the first occurrence of each so the user sees a stable order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Maps stored field values onto `slot_count` form slots by position.
pub fn map_fields_positionally(stored: &[String], slot_count: usize) -> Vec<String> {
    (0..slot_count)
        .map(|i| stored.get(i).cloned().unwrap_or_default())
        .collect()
}

/// True when every field is whitespace-only and there are no tags.
pub fn is_blank(fields: &[String], tags: &[String]) -> bool {
    tags.is_empty() && fields.iter().all(|f| f.trim().is_empty())
}
