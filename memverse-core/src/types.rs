//! Core type definitions for the memory universe.
//!
//! All persistent types are serializable. Positions use [`glam::Vec3`].

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, VerseError};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identifier for a memory item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(pub String);

impl MemoryId {
    /// Create a new random memory ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemoryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MemoryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Memory item
// ---------------------------------------------------------------------------

/// One photo fragment floating in the universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    /// Unique identifier.
    pub id: MemoryId,
    /// Image reference (URI or data URL).
    pub url: String,
    /// Free-text description shown in the detail view.
    pub description: String,
    /// Calendar date the memory belongs to.
    pub date: NaiveDate,
    /// Epoch milliseconds at UTC midnight of `date`. Canonical sort key.
    pub timestamp: i64,
    /// Assigned by the placement pass; never persisted.
    #[serde(skip)]
    pub position: Option<Vec3>,
}

impl MemoryItem {
    /// Create a memory with a fresh random ID.
    #[must_use]
    pub fn new(url: impl Into<String>, description: impl Into<String>, date: NaiveDate) -> Self {
        Self::with_id(MemoryId::generate(), url, description, date)
    }

    /// Create a memory with an explicit ID.
    #[must_use]
    pub fn with_id(
        id: impl Into<MemoryId>,
        url: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            description: description.into(),
            date,
            timestamp: timestamp_for(date),
            position: None,
        }
    }

    /// Parse a `YYYY-MM-DD` date as entered in the upload form.
    ///
    /// # Errors
    /// Returns [`VerseError::InvalidDate`] when the input is not a valid date.
    pub fn parse_date(input: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|e| VerseError::InvalidDate {
            input: input.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Epoch milliseconds at UTC midnight of `date`.
#[must_use]
pub fn timestamp_for(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// One tick of the render loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTick {
    /// Seconds since the scene started.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub delta: f32,
}

impl FrameTick {
    /// Create a tick.
    #[must_use]
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self { elapsed, delta }
    }

    /// The tick that follows this one after `delta` seconds.
    #[must_use]
    pub fn advance(self, delta: f32) -> Self {
        Self {
            elapsed: self.elapsed + delta,
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).expect("date");
        assert_eq!(timestamp_for(date), 1_577_836_800_000);
    }

    #[test]
    fn later_dates_sort_later() {
        let a = MemoryItem::new("a.jpg", "a", NaiveDate::from_ymd_opt(2021, 3, 4).expect("date"));
        let b = MemoryItem::new("b.jpg", "b", NaiveDate::from_ymd_opt(2021, 3, 5).expect("date"));
        assert!(a.timestamp < b.timestamp);
        assert_eq!(b.timestamp - a.timestamp, 86_400_000);
    }

    #[test]
    fn parse_date_accepts_form_input() {
        let date = MemoryItem::parse_date(" 2024-02-29 ").expect("leap day");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).expect("date"));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        let err = MemoryItem::parse_date("2023-02-30").unwrap_err();
        assert!(matches!(err, VerseError::InvalidDate { .. }));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(MemoryId::generate(), MemoryId::generate());
    }

    #[test]
    fn position_is_not_serialized() {
        let mut item = MemoryItem::with_id(
            "mem-0",
            "x.jpg",
            "x",
            NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
        );
        item.position = Some(Vec3::ONE);
        let bytes = bincode::serialize(&item).expect("serialize");
        let back: MemoryItem = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(back.id, item.id);
        assert!(back.position.is_none());
    }

    #[test]
    fn frame_tick_advances() {
        let tick = FrameTick::default().advance(0.5).advance(0.25);
        assert!((tick.elapsed - 0.75).abs() < 1e-6);
        assert!((tick.delta - 0.25).abs() < 1e-6);
    }
}
