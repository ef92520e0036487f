use {bevy::prelude::*, prefs::KeyValueStore};

/// Prefs key of the 0-based index of the level being progressed through.
pub const CURRENT_LEVEL_KEY: &str = "CurrentLevel";

/// `Level_<N>_Completed`, stored as int 0/1.
pub fn level_completed_key(level: u32) -> String {
    format!("Level_{}_Completed", level)
}

/// Level 1 is always unlocked; level `n` needs level `n - 1` completed.
pub fn is_level_unlocked(store: &dyn KeyValueStore, level: u32) -> bool {
    match level {
        0 => false,
        1 => true,
        n => is_level_completed(store, n - 1),
    }
}

pub fn is_level_completed(store: &dyn KeyValueStore, level: u32) -> bool {
    store.get_int(&level_completed_key(level)) == Some(1)
}

/// Which level the player is progressing through. Levels are 1-based in
/// every API; only the persisted `CurrentLevel` value is 0-based.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelPointer {
    index: u32,
    total: u32,
}

impl LevelPointer {
    /// Reads the pointer back, falling back to the first level when the
    /// stored index is out of range.
    pub fn load(store: &dyn KeyValueStore, total: u32) -> Self {
        let stored = store.get_int(CURRENT_LEVEL_KEY).unwrap_or(0);
        let index = match u32::try_from(stored) {
            Ok(index) if index < total || total == 0 => index,
            _ => {
                warn!(stored, total, "Stored level pointer out of range, starting over");
                0
            }
        };
        Self { index, total }
    }

    pub fn current_level(&self) -> u32 {
        self.index + 1
    }

    pub fn total_levels(&self) -> u32 {
        self.total
    }

    /// Points at `level` after an explicit level load.
    pub fn set_current(&mut self, store: &mut dyn KeyValueStore, level: u32) {
        self.index = level.saturating_sub(1);
        self.persist(store);
    }

    /// Marks `completed` as done and moves to the level after it, wrapping to
    /// the first level past the last one. Returns the next level.
    pub fn advance_to_next(&mut self, store: &mut dyn KeyValueStore, completed: u32) -> u32 {
        store.set_int(&level_completed_key(completed), 1);

        self.index = if completed >= self.total { 0 } else { completed };
        self.persist(store);
        self.current_level()
    }

    /// Forgets every completion flag up to `max_level` and rewinds to level 1.
    pub fn reset_levels(&mut self, store: &mut dyn KeyValueStore, max_level: u32) -> usize {
        let mut deleted = 0;
        for level in 1..=max_level.max(self.total) {
            if store.delete(&level_completed_key(level)) {
                deleted += 1;
            }
        }
        self.index = 0;
        self.persist(store);
        deleted
    }

    fn persist(&self, store: &mut dyn KeyValueStore) {
        store.set_int(CURRENT_LEVEL_KEY, self.index as i32);
        if let Err(e) = store.flush() {
            error!("Failed to persist level pointer: {}", e);
        }
    }
}
