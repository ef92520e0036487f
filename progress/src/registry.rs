use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    std::collections::{BTreeSet, HashSet},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub item_id: String,
    #[serde(default)]
    pub sprite_name: String,
}

/// Persisted form of one level's progress.
///
/// Field names are part of the stored layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    pub placed_items: Vec<PlacedItem>,
    pub current_level: i32,
    pub total_items_placed: i32,
    pub total_play_time: f32,
    pub last_play_date: String,
}

/// Read access to placement state, used by everything that is not the registry.
pub trait PlacementLookup {
    fn is_placed(&self, item_id: &str) -> bool;
}

impl PlacementLookup for HashSet<String> {
    fn is_placed(&self, item_id: &str) -> bool {
        self.contains(item_id)
    }
}

impl PlacementLookup for BTreeSet<String> {
    fn is_placed(&self, item_id: &str) -> bool {
        self.contains(item_id)
    }
}

/// Ground truth of which items are placed in the active level.
///
/// Only the progress plugin mutates it; other crates go through
/// [`PlacementLookup`] and the read accessors.
#[derive(Resource, Debug, Default)]
pub struct GameProgress {
    record: ProgressRecord,
    placed: HashSet<String>,
}

impl GameProgress {
    /// Rebuilds the registry from a stored record, dropping duplicate ids.
    pub fn from_record(mut record: ProgressRecord) -> Self {
        let mut placed = HashSet::with_capacity(record.placed_items.len());
        record.placed_items.retain(|item| {
            if item.item_id.is_empty() {
                warn!("Dropping stored placement with an empty item id");
                return false;
            }
            if !placed.insert(item.item_id.clone()) {
                warn!(item_id = %item.item_id, "Dropping duplicate stored placement");
                return false;
            }
            true
        });

        Self { record, placed }
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    /// Records a placement. Returns `false` when the item was already placed
    /// or the id is empty.
    pub fn mark_placed(&mut self, item_id: &str, sprite_name: &str) -> bool {
        if item_id.is_empty() {
            warn!("Ignoring placement with an empty item id");
            return false;
        }
        if !self.placed.insert(item_id.to_string()) {
            debug!(%item_id, "Item already placed, ignoring");
            return false;
        }

        self.record.placed_items.push(PlacedItem {
            item_id: item_id.to_string(),
            sprite_name: sprite_name.to_string(),
        });
        self.record.total_items_placed = self.record.total_items_placed.saturating_add(1);
        true
    }

    /// Removes a placement. The lifetime counter is left untouched.
    pub fn unmark_placed(&mut self, item_id: &str) -> bool {
        if !self.placed.remove(item_id) {
            return false;
        }
        self.record.placed_items.retain(|item| item.item_id != item_id);
        true
    }

    pub fn placed_items(&self) -> &[PlacedItem] {
        &self.record.placed_items
    }

    pub fn placed_count(&self) -> usize {
        self.record.placed_items.len()
    }

    pub fn total_items_placed(&self) -> i32 {
        self.record.total_items_placed
    }

    pub fn total_play_time(&self) -> f32 {
        self.record.total_play_time
    }

    pub fn add_play_time(&mut self, seconds: f32) {
        self.record.total_play_time += seconds;
    }

    pub fn set_current_level(&mut self, level: i32) {
        self.record.current_level = level;
    }

    pub(crate) fn stamp_play_date(&mut self, date: String) {
        self.record.last_play_date = date;
    }

    pub fn clear(&mut self) {
        let current_level = self.record.current_level;
        *self = Self::default();
        self.record.current_level = current_level;
    }
}

impl PlacementLookup for GameProgress {
    fn is_placed(&self, item_id: &str) -> bool {
        !item_id.is_empty() && self.placed.contains(item_id)
    }
}
