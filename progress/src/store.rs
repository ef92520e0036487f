//! Mapping between levels and persisted progress slots.

use {
    crate::registry::{GameProgress, ProgressRecord},
    bevy::prelude::*,
    chrono::Local,
    level_assets::{parse_level_number, ActiveLevel},
    prefs::KeyValueStore,
};

/// Used when a level has neither a numbered scene name nor a configured key.
pub const GLOBAL_PROGRESS_KEY: &str = "GameProgress";

/// Upper bound of the slot scan done by a full reset.
pub const MAX_LEVEL_SLOTS: u32 = 100;

pub fn level_progress_key(level: u32) -> String {
    format!("Level_{}_Progress", level)
}

/// Resolves the slot key for a scene: numbered scene first, then the
/// configured key, then the global fallback.
pub fn slot_key(scene: &str, configured: Option<&str>) -> String {
    if let Some(level) = parse_level_number(scene) {
        return level_progress_key(level);
    }

    match configured.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => key.to_string(),
        None => GLOBAL_PROGRESS_KEY.to_string(),
    }
}

/// The slot the active level reads from and writes to.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ProgressSlot {
    pub key: String,
    /// Configured fallback key of the level, wiped by a full reset as well.
    pub configured_key: Option<String>,
}

impl ProgressSlot {
    pub fn for_level(level: &ActiveLevel) -> Self {
        let configured_key = level.definition.save_key.clone();
        Self {
            key: slot_key(level.scene(), configured_key.as_deref()),
            configured_key,
        }
    }
}

impl Default for ProgressSlot {
    fn default() -> Self {
        Self {
            key: GLOBAL_PROGRESS_KEY.to_string(),
            configured_key: None,
        }
    }
}

/// Reads the record stored under `key`.
///
/// A missing slot is a fresh start. A slot that does not deserialize is
/// discarded and also treated as a fresh start.
pub fn load_record(store: &dyn KeyValueStore, key: &str) -> ProgressRecord {
    let Some(raw) = store.get_string(key) else {
        debug!(slot = %key, "No stored progress, starting fresh");
        return ProgressRecord::default();
    };

    match serde_json::from_str(raw) {
        Ok(record) => record,
        Err(e) => {
            warn!(slot = %key, "Stored progress is corrupted, starting fresh: {}", e);
            ProgressRecord::default()
        }
    }
}

/// Writes the registry snapshot to `key` and flushes the store.
///
/// Failures are logged; the in-memory registry stays authoritative.
pub fn save_progress(store: &mut dyn KeyValueStore, key: &str, progress: &mut GameProgress) {
    progress.stamp_play_date(Local::now().to_rfc3339());

    let serialized = match serde_json::to_string(progress.record()) {
        Ok(data) => data,
        Err(e) => {
            error!(slot = %key, "Failed to serialize progress: {}", e);
            return;
        }
    };

    store.set_string(key, serialized);
    match store.flush() {
        Ok(()) => trace!(slot = %key, placed = progress.placed_count(), "Progress saved"),
        Err(e) => error!(slot = %key, "Failed to persist progress: {}", e),
    }
}

/// Deletes every slot a full reset covers and returns how many existed.
pub fn delete_all_slots(store: &mut dyn KeyValueStore, slot: &ProgressSlot) -> usize {
    let mut deleted = 0;
    for level in 1..=MAX_LEVEL_SLOTS {
        if store.delete(&level_progress_key(level)) {
            deleted += 1;
        }
    }

    let extra_keys = [
        Some(slot.key.as_str()),
        slot.configured_key.as_deref(),
        Some(GLOBAL_PROGRESS_KEY),
    ];
    for key in extra_keys.into_iter().flatten() {
        if store.delete(key) {
            deleted += 1;
        }
    }

    if let Err(e) = store.flush() {
        error!("Failed to persist progress reset: {}", e);
    }
    deleted
}
