//! Batch progression: which drop spots are available, when a batch is
//! complete, and when the level is done.
//!
//! The position inside a level is never stored. It is recomputed from the
//! placed-item set every time a level is entered, so it always agrees with
//! the persisted progress.

pub mod plan;
mod scheduler;
pub mod systems;

pub use plan::{BatchPlan, ResumePoint};
pub use scheduler::{BatchPhase, BatchProgress, BatchScheduler, PlacementOutcome};

use {
    ad_gate::AdGatePlugin,
    bevy::{ecs::system::SystemParam, prelude::*},
    progress::{GameProgress, PlacementLookup},
    states::GameState,
    system_schedule::LevelLoad,
};

/// Read-only view combining the scheduler with the placement registry.
#[derive(SystemParam)]
pub struct BatchStatus<'w> {
    scheduler: Res<'w, BatchScheduler>,
    progress: Res<'w, GameProgress>,
}

impl BatchStatus<'_> {
    pub fn phase(&self) -> BatchPhase {
        self.scheduler.phase()
    }

    pub fn progress(&self) -> BatchProgress {
        self.scheduler.progress()
    }

    pub fn available_targets(&self) -> Vec<&str> {
        self.scheduler.available_targets(&*self.progress)
    }

    pub fn is_placeable(&self, item_id: &str) -> bool {
        self.scheduler.is_placeable(item_id, &*self.progress)
    }

    pub fn is_placed(&self, item_id: &str) -> bool {
        self.progress.is_placed(item_id)
    }
}

pub struct BatchesPlugin;

impl Plugin for BatchesPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<AdGatePlugin>() {
            app.add_plugins(AdGatePlugin);
        }

        app.init_resource::<BatchScheduler>()
            .add_systems(
                OnEnter(GameState::InLevel),
                systems::initialize_batches.in_set(LevelLoad::ScheduleBatches),
            )
            .add_systems(OnExit(GameState::InLevel), systems::clean_up_batches)
            .add_observer(systems::on_item_placed)
            .add_observer(systems::on_item_removed)
            .add_observer(systems::on_gate_released)
            .add_observer(systems::on_progress_cleared);
    }
}
