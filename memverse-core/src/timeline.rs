//! The chronologically ordered memory collection.
//!
//! The timeline is the single source of ordering for placement: index 0 is
//! the oldest memory and sits on the innermost shell.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PlacementConfig;
use crate::error::{Result, VerseError};
use crate::placement::{Placement, place_memories};
use crate::types::{MemoryId, MemoryItem};

/// Image used for generated demo memories.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;utf8,\
<svg xmlns='http://www.w3.org/2000/svg' width='400' height='300'>\
<rect width='400' height='300' fill='%23020005'/>\
<circle cx='200' cy='150' r='60' fill='none' stroke='%2322d3ee' stroke-width='2'/>\
<text x='200' y='145' text-anchor='middle' fill='%23e879f9' font-family='monospace' font-size='20'>MEMORY_FRAGMENT</text>\
<text x='200' y='170' text-anchor='middle' fill='%23ffffff' font-family='monospace' font-size='14'>ENCRYPTED_DATA</text>\
</svg>";

/// Memories sorted by timestamp, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    items: Vec<MemoryItem>,
}

impl Timeline {
    /// Create an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline from unsorted items. Ties keep their input order.
    ///
    /// IDs are unique: only the first item carrying a given ID is kept.
    #[must_use]
    pub fn from_items(items: Vec<MemoryItem>) -> Self {
        let mut seen = HashSet::with_capacity(items.len());
        let mut items: Vec<MemoryItem> = items
            .into_iter()
            .filter(|m| {
                let fresh = seen.insert(m.id.clone());
                if !fresh {
                    warn!(id = %m.id, "Dropping memory with duplicate id");
                }
                fresh
            })
            .collect();
        items.sort_by_key(|m| m.timestamp);
        Self { items }
    }

    /// Demo data: `count` memories `spacing_days` apart starting at `start`.
    pub fn placeholder<R: Rng + ?Sized>(
        count: usize,
        start: NaiveDate,
        spacing_days: u64,
        rng: &mut R,
    ) -> Self {
        let items = (0..count)
            .map(|i| {
                let date = start
                    .checked_add_days(Days::new(i as u64 * spacing_days))
                    .unwrap_or(NaiveDate::MAX);
                let sector = rng.gen_range(0..99);
                MemoryItem::with_id(
                    format!("mem-{i}"),
                    PLACEHOLDER_IMAGE,
                    format!(
                        "Memory Log #{}: Analyzed pattern data from sector {sector}. \
                         Subject displayed high emotional resonance.",
                        i + 1
                    ),
                    date,
                )
            })
            .collect();
        Self::from_items(items)
    }

    /// Insert keeping chronological order; equal timestamps go after the
    /// existing ones. Returns the new item's index.
    ///
    /// # Errors
    /// Returns `VerseError::DuplicateMemory` if the ID is already present;
    /// the timeline is left unchanged.
    pub fn insert(&mut self, item: MemoryItem) -> Result<usize> {
        if self.find(&item.id).is_some() {
            return Err(VerseError::DuplicateMemory(item.id.to_string()));
        }
        let index = self
            .items
            .partition_point(|m| m.timestamp <= item.timestamp);
        debug!(id = %item.id, index, "Inserted memory into timeline");
        self.items.insert(index, item);
        Ok(index)
    }

    /// Remove a memory by ID.
    pub fn remove(&mut self, id: &MemoryId) -> Option<MemoryItem> {
        let index = self.index_of(id)?;
        Some(self.items.remove(index))
    }

    /// All memories, oldest first.
    #[must_use]
    pub fn items(&self) -> &[MemoryItem] {
        &self.items
    }

    /// Number of memories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the timeline is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a memory by ID.
    #[must_use]
    pub fn find(&self, id: &MemoryId) -> Option<&MemoryItem> {
        self.items.iter().find(|m| &m.id == id)
    }

    /// Chronological index of a memory.
    #[must_use]
    pub fn index_of(&self, id: &MemoryId) -> Option<usize> {
        self.items.iter().position(|m| &m.id == id)
    }

    /// Run placement over the current order and store each position on its
    /// item.
    pub fn layout<R: Rng + ?Sized>(
        &mut self,
        config: &PlacementConfig,
        rng: &mut R,
    ) -> Vec<Placement> {
        let placements = place_memories(self.items.len(), config, rng);
        for (item, placement) in self.items.iter_mut().zip(&placements) {
            item.position = Some(placement.position);
        }
        placements
    }

    /// Positions in chronological order; unplaced memories report the
    /// origin.
    #[must_use]
    pub fn positions(&self) -> Vec<Vec3> {
        self.items
            .iter()
            .map(|m| m.position.unwrap_or(Vec3::ZERO))
            .collect()
    }

    /// Whether timestamps are non-decreasing.
    #[must_use]
    pub fn is_chronological(&self) -> bool {
        self.items.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn from_items_sorts_by_timestamp() {
        let timeline = Timeline::from_items(vec![
            MemoryItem::with_id("c", "c.jpg", "", date(2022, 1, 1)),
            MemoryItem::with_id("a", "a.jpg", "", date(2020, 1, 1)),
            MemoryItem::with_id("b", "b.jpg", "", date(2021, 1, 1)),
        ]);
        let ids: Vec<&str> = timeline.items().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn insert_keeps_order_and_ties_go_last() {
        let mut timeline = Timeline::from_items(vec![
            MemoryItem::with_id("a", "", "", date(2020, 1, 1)),
            MemoryItem::with_id("c", "", "", date(2020, 1, 3)),
        ]);
        let insert = |t: &mut Timeline, id: &str, d: NaiveDate| {
            t.insert(MemoryItem::with_id(id, "", "", d)).expect("fresh id")
        };
        assert_eq!(insert(&mut timeline, "b", date(2020, 1, 2)), 1);
        assert_eq!(insert(&mut timeline, "b2", date(2020, 1, 2)), 2);
        assert_eq!(timeline.index_of(&MemoryId::from("b2")), Some(2));
        assert_eq!(insert(&mut timeline, "z", date(2019, 6, 1)), 0);
        assert!(timeline.is_chronological());
        assert_eq!(timeline.index_of(&MemoryId::from("b2")), Some(3));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut timeline = Timeline::from_items(vec![MemoryItem::with_id("x", "", "", date(2020, 1, 1))]);
        let err = timeline
            .insert(MemoryItem::with_id("x", "other.jpg", "", date(2021, 1, 1)))
            .expect_err("duplicate");
        assert!(matches!(err, VerseError::DuplicateMemory(ref id) if id == "x"));
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.items()[0].date, date(2020, 1, 1));
    }

    #[test]
    fn from_items_keeps_first_of_duplicates() {
        let timeline = Timeline::from_items(vec![
            MemoryItem::with_id("x", "first.jpg", "", date(2021, 1, 1)),
            MemoryItem::with_id("y", "", "", date(2020, 1, 1)),
            MemoryItem::with_id("x", "second.jpg", "", date(2019, 1, 1)),
        ]);
        assert_eq!(timeline.len(), 2);
        let x = timeline.find(&MemoryId::from("x")).expect("x kept");
        assert_eq!(x.url, "first.jpg");
    }

    #[test]
    fn placeholder_matches_demo_set() {
        let timeline = Timeline::placeholder(100, date(2020, 1, 1), 5, &mut StdRng::seed_from_u64(1));
        assert_eq!(timeline.len(), 100);
        let first = &timeline.items()[0];
        assert_eq!(first.id.as_str(), "mem-0");
        assert_eq!(first.date, date(2020, 1, 1));
        assert!(first.description.starts_with("Memory Log #1: "));
        assert_eq!(timeline.items()[1].date, date(2020, 1, 6));
        assert_eq!(timeline.items()[99].id.as_str(), "mem-99");
        assert!(timeline.is_chronological());
    }

    #[test]
    fn layout_assigns_positions() {
        let mut timeline = Timeline::placeholder(10, date(2020, 1, 1), 1, &mut StdRng::seed_from_u64(2));
        assert!(timeline.positions().iter().all(|p| *p == Vec3::ZERO));

        let placements = timeline.layout(&PlacementConfig::default(), &mut StdRng::seed_from_u64(2));
        assert_eq!(placements.len(), 10);
        for (item, placement) in timeline.items().iter().zip(&placements) {
            assert_eq!(item.position, Some(placement.position));
        }
    }

    #[test]
    fn find_and_remove() {
        let mut timeline = Timeline::placeholder(3, date(2020, 1, 1), 1, &mut StdRng::seed_from_u64(3));
        let id = MemoryId::from("mem-1");
        assert!(timeline.find(&id).is_some());
        assert_eq!(timeline.remove(&id).map(|m| m.id), Some(id.clone()));
        assert!(timeline.find(&id).is_none());
        assert!(timeline.remove(&id).is_none());
        assert_eq!(timeline.len(), 2);
    }
}
