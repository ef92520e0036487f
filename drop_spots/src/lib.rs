//! Drop spot identity: id → entity cache, ordered target list and the
//! visual state of every spot.

mod index;
pub mod systems;

pub use index::{DropSpotIndex, IndexReport};

use {
    bevy::prelude::*,
    drop_spot_components::DropSpotComponentsPlugin,
    states::GameState,
    system_schedule::LevelLoad,
};

/// Represents the player releasing a dragged item over a spot.
///
/// This **Observer** event is triggered by the drag collaborator.
///
/// # Observers
/// - `systems::on_item_dropped`: accepts the drop when the spot is
///   `Available` and expects this item, then triggers
///   `progress_events::MarkPlaced`. Otherwise triggers [`DropRejected`].
#[derive(Event, Debug, Clone)]
pub struct ItemDropped {
    pub spot: Entity,
    pub item_id: String,
    pub sprite_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnknownSpot,
    NotAvailable,
    WrongItem,
}

/// The drag collaborator animates the item back to the bar.
#[derive(Event, Debug, Clone)]
pub struct DropRejected {
    pub item_id: String,
    pub reason: RejectReason,
}

pub struct DropSpotsPlugin;

impl Plugin for DropSpotsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DropSpotComponentsPlugin)
            .init_resource::<DropSpotIndex>()
            .add_systems(
                OnEnter(GameState::InLevel),
                systems::index_drop_spots.in_set(LevelLoad::IndexSpots),
            )
            .add_systems(
                Update,
                systems::prune_removed_spots.run_if(in_state(GameState::InLevel)),
            )
            .add_systems(OnExit(GameState::InLevel), systems::clean_up_drop_spots)
            .add_observer(systems::on_item_dropped)
            .add_observer(systems::on_spots_hidden)
            .add_observer(systems::on_spot_activated)
            .add_observer(systems::on_spot_revealed)
            .add_observer(systems::on_spot_hidden)
            .add_observer(systems::on_item_placed);
    }
}
