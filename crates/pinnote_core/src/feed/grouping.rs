//! Date-bucketed list grouping.
//!
//! # Responsibility
//! - Turn an already-filtered note list into display order with
//!   "Today" / "Yesterday" / `dd/MM/yyyy` section headers.
//!
//! # Invariants
//! - Pinned notes come first, then the rest; each part keeps its own header
//!   run, so a day shared by both parts is labeled once per part.
//! - A header is emitted only when it differs from the previous header of
//!   the same part.
//! - Notes inside a part keep their incoming relative order unless
//!   `SortPolicy::NewestFirst` is requested.

use crate::model::note::Note;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Day format used for header keys.
pub const HEADER_DATE_FORMAT: &str = "%d/%m/%Y";

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NoteListItem {
    Header(String),
    Item(Note),
}

impl NoteListItem {
    pub fn as_header(&self) -> Option<&str> {
        match self {
            Self::Header(label) => Some(label.as_str()),
            Self::Item(_) => None,
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Self::Header(_) => None,
            Self::Item(note) => Some(note),
        }
    }
}

/// Labels substituted for the current and previous day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingLabels {
    pub today: String,
    pub yesterday: String,
}

impl Default for GroupingLabels {
    fn default() -> Self {
        Self {
            today: "Today".to_string(),
            yesterday: "Yesterday".to_string(),
        }
    }
}

/// Ordering applied inside each pinned/unpinned part before grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortPolicy {
    /// Keep the incoming order.
    #[default]
    StoreOrder,
    /// Stable sort by creation time, newest first.
    NewestFirst,
}

/// Groups notes under day headers computed in a fixed time zone.
#[derive(Debug, Clone)]
pub struct NoteGrouper<Tz: TimeZone> {
    tz: Tz,
    labels: GroupingLabels,
}

impl<Tz> NoteGrouper<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(tz: Tz) -> Self {
        Self::with_labels(tz, GroupingLabels::default())
    }

    pub fn with_labels(tz: Tz, labels: GroupingLabels) -> Self {
        Self { tz, labels }
    }

    pub fn labels(&self) -> &GroupingLabels {
        &self.labels
    }

    /// Groups `notes` in their incoming order relative to `now_ms`.
    pub fn group(&self, notes: &[Note], now_ms: i64) -> Vec<NoteListItem> {
        self.group_with(notes, now_ms, SortPolicy::StoreOrder)
    }

    /// Groups `notes` relative to `now_ms` using `policy` inside each part.
    pub fn group_with(
        &self,
        notes: &[Note],
        now_ms: i64,
        policy: SortPolicy,
    ) -> Vec<NoteListItem> {
        let (mut pinned, mut unpinned): (Vec<&Note>, Vec<&Note>) =
            notes.iter().partition(|note| note.is_pinned);
        if policy == SortPolicy::NewestFirst {
            pinned.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            unpinned.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        }

        let days = RelativeDays::new(&self.tz, now_ms);
        let mut result = Vec::with_capacity(notes.len() * 2);
        for part in [pinned, unpinned] {
            let mut current_header: Option<String> = None;
            for note in part {
                let header = self.header_for(&days, note.timestamp);
                if current_header.as_deref() != Some(header.as_str()) {
                    result.push(NoteListItem::Header(header.clone()));
                    current_header = Some(header);
                }
                result.push(NoteListItem::Item(note.clone()));
            }
        }
        result
    }

    /// Header label for a note created at `timestamp_ms`.
    pub fn header_at(&self, timestamp_ms: i64, now_ms: i64) -> String {
        let days = RelativeDays::new(&self.tz, now_ms);
        self.header_for(&days, timestamp_ms)
    }

    fn header_for(&self, days: &RelativeDays, timestamp_ms: i64) -> String {
        let key = format_day(&self.tz, timestamp_ms);
        if days.today.as_deref() == Some(key.as_str()) {
            self.labels.today.clone()
        } else if days.yesterday.as_deref() == Some(key.as_str()) {
            self.labels.yesterday.clone()
        } else {
            key
        }
    }
}

struct RelativeDays {
    today: Option<String>,
    yesterday: Option<String>,
}

impl RelativeDays {
    /// Yesterday is the calendar date before today, not `now` minus 24 hours.
    fn new<Tz: TimeZone>(tz: &Tz, now_ms: i64) -> Self {
        let today = to_zoned(tz, now_ms).map(|now| now.date_naive());
        Self {
            today: today.map(|day| day.format(HEADER_DATE_FORMAT).to_string()),
            yesterday: today
                .and_then(|day| day.pred_opt())
                .map(|day| day.format(HEADER_DATE_FORMAT).to_string()),
        }
    }
}

fn to_zoned<Tz: TimeZone>(tz: &Tz, epoch_ms: i64) -> Option<DateTime<Tz>> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms).map(|utc| utc.with_timezone(tz))
}

fn format_day<Tz>(tz: &Tz, epoch_ms: i64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match to_zoned(tz, epoch_ms) {
        Some(day) => day.format(HEADER_DATE_FORMAT).to_string(),
        // Validated notes never reach this arm.
        None => epoch_ms.to_string(),
    }
}
