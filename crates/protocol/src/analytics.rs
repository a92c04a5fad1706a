//! Usage counters stored under `analytics`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An incremental analytics notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnalyticsEvent {
    NoteCreated,
    NoteModified,
    WordsAdded { count: u64 },
    CharactersAdded { count: u64 },
}

/// Per-day counters, keyed by `YYYY-MM-DD` in [`Analytics::daily_stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyStats {
    pub notes_created: u64,
    pub notes_modified: u64,
    pub words_written: u64,
    /// Milliseconds.
    pub time_spent: u64,
}

/// Aggregate usage counters.
///
/// Counters are approximate: events are applied as they arrive with no
/// attempt at deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Analytics {
    pub total_notes: u64,
    pub total_words: u64,
    pub total_characters: u64,
    pub sessions_count: u64,
    /// Milliseconds across all ended sessions.
    pub total_time_spent: u64,
    pub last_session: Option<DateTime<Utc>>,
    pub created_today: u64,
    pub modified_today: u64,
    pub average_note_length: f64,
    pub most_used_tags: Vec<String>,
    pub daily_stats: BTreeMap<String, DailyStats>,
    pub weekly_stats: Map<String, Value>,
    pub monthly_stats: Map<String, Value>,
}

/// Storage key for a day in `dailyStats`.
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

impl Analytics {
    /// Applies one event to the totals and to `day`'s entry.
    pub fn record(&mut self, event: AnalyticsEvent, day: NaiveDate) {
        let daily = self.daily_stats.entry(day_key(day)).or_default();
        match event {
            AnalyticsEvent::NoteCreated => {
                self.total_notes += 1;
                daily.notes_created += 1;
            }
            AnalyticsEvent::NoteModified => {
                daily.notes_modified += 1;
            }
            AnalyticsEvent::WordsAdded { count } => {
                self.total_words += count;
                daily.words_written += count;
            }
            AnalyticsEvent::CharactersAdded { count } => {
                self.total_characters += count;
            }
        }
        self.average_note_length = if self.total_notes == 0 {
            0.0
        } else {
            self.total_characters as f64 / self.total_notes as f64
        };
        self.refresh_today(day);
    }

    /// Mirrors `day`'s entry into `createdToday` / `modifiedToday`.
    pub fn refresh_today(&mut self, day: NaiveDate) {
        let today = self.daily_stats.get(&day_key(day)).cloned().unwrap_or_default();
        self.created_today = today.notes_created;
        self.modified_today = today.notes_modified;
    }

    /// Counts a new session starting at `now`.
    pub fn start_session(&mut self, now: DateTime<Utc>) {
        self.sessions_count += 1;
        self.last_session = Some(now);
        self.refresh_today(now.date_naive());
    }

    /// Adds the time between `started` and `now` to the totals.
    pub fn end_session(&mut self, started: DateTime<Utc>, now: DateTime<Utc>) {
        let elapsed = (now - started).num_milliseconds().max(0) as u64;
        self.total_time_spent += elapsed;
        self.daily_stats
            .entry(day_key(now.date_naive()))
            .or_default()
            .time_spent += elapsed;
    }
}
