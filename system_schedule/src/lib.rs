use {bevy::prelude::*, states::GameState};

/// Ordered steps run on `OnEnter(GameState::InLevel)`.
///
/// Each domain crate puts its level-entry system into one of these sets;
/// [`SchedulePlugin`] chains them.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum LevelLoad {
    RestoreProgress, // Slot key resolution + snapshot load
    SpawnSpots,
    IndexSpots,
    ScheduleBatches,
}

/// Per-frame ordering while a level is running.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameSchedule {
    ResolveGate,
    FrameEnd,
}

pub struct SchedulePlugin;

impl Plugin for SchedulePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            OnEnter(GameState::InLevel),
            (
                LevelLoad::RestoreProgress,
                LevelLoad::SpawnSpots,
                LevelLoad::IndexSpots,
                LevelLoad::ScheduleBatches,
            )
                .chain(),
        )
        .configure_sets(
            Update,
            (GameSchedule::ResolveGate, GameSchedule::FrameEnd).chain(),
        );
    }
}
