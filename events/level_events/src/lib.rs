use bevy::prelude::*;

// --- Batch progression ---

/// Fired exactly once when every target of a batch has been placed.
#[derive(Event, Debug, Clone)]
pub struct BatchCompleted {
    pub index: usize,
    pub is_last: bool,
}

/// Fired when a batch becomes the active one and its targets accept drops.
#[derive(Event, Debug, Clone)]
pub struct BatchRevealed {
    pub index: usize,
}

/// Fired once when the last batch completes (after its gate, if any).
///
/// # Observers
/// - `levels::on_level_completed`: marks the level completed and advances the
///   level pointer.
#[derive(Event, Debug, Clone)]
pub struct LevelCompleted {
    /// 1-based level number, `None` when the scene is not a numbered level.
    pub level: Option<u32>,
}

// --- Visual collaborator ---

/// Hide every drop spot. Sent before a batch layout is (re)applied.
#[derive(Event, Debug, Clone, Default)]
pub struct SpotsHidden;

/// A target of the active batch became interactable.
#[derive(Event, Debug, Clone)]
pub struct SpotActivated {
    pub item_id: String,
}

/// A single spot goes back to hidden, e.g. an undone target whose batch is
/// no longer active.
#[derive(Event, Debug, Clone)]
pub struct SpotHidden {
    pub item_id: String,
}

/// Show the hidden art of a placed target.
///
/// `instant` is set when restoring a target placed in an earlier session.
#[derive(Event, Debug, Clone)]
pub struct SpotRevealed {
    pub item_id: String,
    pub instant: bool,
}

// --- Scene loader ---

/// Request to load a level by its 1-based number.
#[derive(Event, Debug, Clone)]
pub struct LoadLevel {
    pub level: u32,
}

#[derive(Event, Debug, Clone, Default)]
pub struct LoadLevelSelection;

/// Fired after the level pointer moved on; carries the level the ending
/// dialog should offer next.
#[derive(Event, Debug, Clone)]
pub struct LevelAdvanced {
    pub completed: u32,
    pub next: u32,
}

/// Forget every level completion and point back at level 1.
#[derive(Event, Debug, Clone, Default)]
pub struct ResetLevels;
