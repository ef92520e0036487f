//! Drop spot identity and visual-state components.
//!
//! A spot is always in exactly one of `Hidden`, `Available` or `Filled`.
//! The batch scheduler drives the transitions through events, the
//! `drop_spots` crate applies them to entities.

use bevy::prelude::*;

pub struct DropSpotComponentsPlugin;

impl Plugin for DropSpotComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<DropSpot>()
            .register_type::<Hidden>()
            .register_type::<Available>()
            .register_type::<Filled>();
    }
}

/// A placement slot in the level, identified by a stable item id.
#[derive(Component, Reflect, Debug, Clone, PartialEq, Eq)]
#[reflect(Component)]
#[require(Hidden)]
pub struct DropSpot {
    pub item_id: String,
    /// Position in the level's ordered target list; batches are ranges over it.
    pub order: usize,
}

impl DropSpot {
    pub fn new(item_id: impl Into<String>, order: usize) -> Self {
        Self {
            item_id: item_id.into(),
            order,
        }
    }
}

/// Not interactable and not shown.
#[derive(Component, Default, Reflect)]
#[reflect(Component)]
pub struct Hidden;

/// Part of the active batch; accepts drops.
#[derive(Component, Reflect)]
#[reflect(Component)]
pub struct Available;

/// Item placed, hidden art revealed. Terminal.
#[derive(Component, Reflect)]
#[reflect(Component)]
pub struct Filled;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_spot_requires_hidden() {
        let mut world = World::new();
        let spot = world.spawn(DropSpot::new("vase", 0)).id();
        assert!(world.entity(spot).contains::<Hidden>());
    }
}
