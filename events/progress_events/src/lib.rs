use bevy::prelude::*;

/// Request to record a placement.
///
/// This **Observer** event is the single entry point for writing placements.
/// Drop spots trigger it when a matching item is dropped on an `Available`
/// spot; tests and debug tools may trigger it directly.
///
/// # Observers
/// - `progress::on_mark_placed`: records the item in `GameProgress`, triggers
///   [`ItemPlaced`] on first placement and persists the snapshot.
#[derive(Event, Debug, Clone)]
pub struct MarkPlaced {
    pub item_id: String,
    /// Informational only, stored alongside the id.
    pub sprite_name: String,
}

impl MarkPlaced {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            sprite_name: String::new(),
        }
    }

    pub fn with_sprite(mut self, sprite_name: impl Into<String>) -> Self {
        self.sprite_name = sprite_name.into();
        self
    }
}

/// Fired once per item, the first time it is placed.
///
/// Delivered in placement order. Replays of an already placed id never
/// produce a second `ItemPlaced`.
#[derive(Event, Debug, Clone)]
pub struct ItemPlaced {
    pub item_id: String,
}

/// Undo request for a placement.
#[derive(Event, Debug, Clone)]
pub struct UnmarkPlaced {
    pub item_id: String,
}

/// Fired after a placement was removed from the registry.
///
/// # Observers
/// - `batches::systems::on_item_removed`: recounts the active batch and re-opens the
///   spot when its target is placeable again, otherwise hides it.
#[derive(Event, Debug, Clone)]
pub struct ItemRemoved {
    pub item_id: String,
}

/// Explicit save request (pause menu, app backgrounding).
#[derive(Event, Debug, Clone, Default)]
pub struct SaveProgress;

/// Which persisted slots a reset wipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    CurrentLevel,
    AllLevels,
}

#[derive(Event, Debug, Clone)]
pub struct ResetProgress(pub ResetScope);

/// Fired after a reset; every spot must go back to its unplaced state.
#[derive(Event, Debug, Clone)]
pub struct ProgressCleared {
    pub scope: ResetScope,
}
