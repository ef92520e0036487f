//! Placement registry and per-level progress persistence.
//!
//! This crate provides:
//! - `GameProgress`, the single source of truth for "is item X placed"
//! - Slot key derivation (`Level_<N>_Progress`, configured key, global key)
//! - Save on every placement, on `SaveProgress`, on level exit and on a
//!   repeating autosave timer
//! - Undo and reset handling

mod registry;
pub mod store;
pub mod systems;

pub use registry::{GameProgress, PlacedItem, PlacementLookup, ProgressRecord};
pub use store::{ProgressSlot, GLOBAL_PROGRESS_KEY, MAX_LEVEL_SLOTS};

use {
    bevy::prelude::*,
    serde::Deserialize,
    states::GameState,
    system_schedule::{GameSchedule, LevelLoad},
};

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    pub autosave_interval_secs: f32,
    /// Location of the prefs file, relative to the working directory.
    pub prefs_path: String,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            autosave_interval_secs: 60.0,
            prefs_path: "saves/prefs.json".to_string(),
        }
    }
}

/// Timer resource for automatic saves.
#[derive(Resource)]
pub struct AutosaveTimer(pub Timer);

impl AutosaveTimer {
    pub fn from_settings(settings: &ProgressSettings) -> Self {
        let secs = settings.autosave_interval_secs.max(1.0);
        Self(Timer::from_seconds(secs, TimerMode::Repeating))
    }
}

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self::from_settings(&ProgressSettings::default())
    }
}

pub struct ProgressPlugin;

impl Plugin for ProgressPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProgressSettings>()
            .init_resource::<GameProgress>()
            .init_resource::<ProgressSlot>()
            .init_resource::<AutosaveTimer>()
            .init_resource::<prefs::Prefs>()
            .add_systems(
                OnEnter(GameState::InLevel),
                systems::restore_progress.in_set(LevelLoad::RestoreProgress),
            )
            .add_systems(
                Update,
                (systems::track_play_time, systems::autosave)
                    .chain()
                    .in_set(GameSchedule::FrameEnd)
                    .run_if(in_state(GameState::InLevel)),
            )
            .add_systems(OnExit(GameState::InLevel), systems::save_on_exit)
            .add_observer(systems::on_mark_placed)
            .add_observer(systems::on_unmark_placed)
            .add_observer(systems::on_save_requested)
            .add_observer(systems::on_reset_requested);
    }
}
