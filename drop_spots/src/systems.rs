use {
    crate::{DropRejected, DropSpotIndex, ItemDropped, RejectReason},
    bevy::prelude::*,
    drop_spot_components::{Available, DropSpot, Filled, Hidden},
    level_events::{SpotActivated, SpotHidden, SpotRevealed, SpotsHidden},
    progress_events::{ItemPlaced, MarkPlaced},
};

pub fn index_drop_spots(mut index: ResMut<DropSpotIndex>, spots: Query<(Entity, &DropSpot)>) {
    let report = index.rebuild(spots.iter());

    for item_id in &report.duplicate_ids {
        error!(%item_id, "Duplicate drop spot id, only the first spot is used");
    }
    if report.empty_ids > 0 {
        error!(count = report.empty_ids, "Drop spots without an item id are ignored");
    }
    info!(targets = index.len(), "Drop spots indexed");
}

pub fn prune_removed_spots(
    mut removed: RemovedComponents<DropSpot>,
    mut index: ResMut<DropSpotIndex>,
) {
    for entity in removed.read() {
        if let Some(item_id) = index.notify_removed(entity) {
            debug!(%item_id, "Drop spot removed from index");
        }
    }
}

pub fn on_item_dropped(
    trigger: On<ItemDropped>,
    mut commands: Commands,
    spots: Query<(&DropSpot, Has<Available>)>,
) {
    let ItemDropped {
        spot,
        item_id,
        sprite_name,
    } = trigger.event();

    let reason = match spots.get(*spot) {
        Err(_) => Some(RejectReason::UnknownSpot),
        Ok((_, false)) => Some(RejectReason::NotAvailable),
        Ok((drop_spot, true)) if drop_spot.item_id != *item_id => Some(RejectReason::WrongItem),
        Ok(_) => None,
    };

    if let Some(reason) = reason {
        trace!(%item_id, ?reason, "Drop rejected");
        commands.trigger(DropRejected {
            item_id: item_id.clone(),
            reason,
        });
        return;
    }

    commands.trigger(MarkPlaced::new(item_id.clone()).with_sprite(sprite_name.clone()));
}

pub fn on_spots_hidden(
    _trigger: On<SpotsHidden>,
    mut commands: Commands,
    spots: Query<Entity, With<DropSpot>>,
) {
    for entity in &spots {
        commands
            .entity(entity)
            .remove::<(Available, Filled)>()
            .insert(Hidden);
    }
}

pub fn on_spot_activated(
    trigger: On<SpotActivated>,
    mut commands: Commands,
    index: Res<DropSpotIndex>,
) {
    let item_id = &trigger.event().item_id;
    let Some(entity) = index.entity(item_id) else {
        warn!(%item_id, "Cannot activate unknown drop spot");
        return;
    };
    commands
        .entity(entity)
        .remove::<(Hidden, Filled)>()
        .insert(Available);
}

pub fn on_spot_revealed(
    trigger: On<SpotRevealed>,
    mut commands: Commands,
    index: Res<DropSpotIndex>,
) {
    let item_id = &trigger.event().item_id;
    let Some(entity) = index.entity(item_id) else {
        warn!(%item_id, "Cannot reveal unknown drop spot");
        return;
    };
    commands
        .entity(entity)
        .remove::<(Hidden, Available)>()
        .insert(Filled);
}

/// A live placement reveals its spot's art.
pub fn on_item_placed(trigger: On<ItemPlaced>, mut commands: Commands) {
    commands.trigger(SpotRevealed {
        item_id: trigger.event().item_id.clone(),
        instant: false,
    });
}

pub fn on_spot_hidden(trigger: On<SpotHidden>, mut commands: Commands, index: Res<DropSpotIndex>) {
    let item_id = &trigger.event().item_id;
    let Some(entity) = index.entity(item_id) else {
        warn!(%item_id, "Cannot hide unknown drop spot");
        return;
    };
    commands
        .entity(entity)
        .remove::<(Available, Filled)>()
        .insert(Hidden);
}

pub fn clean_up_drop_spots(
    mut commands: Commands,
    mut index: ResMut<DropSpotIndex>,
    spots: Query<Entity, With<DropSpot>>,
) {
    for entity in &spots {
        commands.entity(entity).despawn();
    }
    index.clear();
}

#[cfg(test)]
mod tests {
    use {super::*, bevy::state::app::StatesPlugin, crate::DropSpotsPlugin, states::GameState};

    #[derive(Resource, Default)]
    struct Requests {
        placed: Vec<String>,
        rejected: Vec<RejectReason>,
    }

    fn setup() -> (App, Entity, Entity) {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<GameState>()
            .add_plugins(DropSpotsPlugin)
            .init_resource::<Requests>()
            .add_observer(|trigger: On<MarkPlaced>, mut requests: ResMut<Requests>| {
                requests.placed.push(trigger.event().item_id.clone());
            })
            .add_observer(|trigger: On<DropRejected>, mut requests: ResMut<Requests>| {
                requests.rejected.push(trigger.event().reason);
            });

        let cup = app.world_mut().spawn(DropSpot::new("cup", 0)).id();
        let hat = app.world_mut().spawn(DropSpot::new("hat", 1)).id();
        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(GameState::InLevel);
        app.update();
        (app, cup, hat)
    }

    fn drop_item(app: &mut App, spot: Entity, item_id: &str) {
        app.world_mut().trigger(ItemDropped {
            spot,
            item_id: item_id.to_string(),
            sprite_name: String::new(),
        });
        app.update();
    }

    #[test]
    fn test_spots_indexed_on_level_entry() {
        let (app, cup, _) = setup();
        let index = app.world().resource::<DropSpotIndex>();
        assert_eq!(index.ordered_ids(), ["cup", "hat"]);
        assert_eq!(index.entity("cup"), Some(cup));
    }

    #[test]
    fn test_drop_only_accepted_on_available_matching_spot() {
        let (mut app, cup, hat) = setup();

        drop_item(&mut app, cup, "cup");
        app.world_mut().trigger(SpotActivated {
            item_id: "cup".to_string(),
        });
        app.update();
        drop_item(&mut app, cup, "hat");
        drop_item(&mut app, cup, "cup");
        drop_item(&mut app, hat, "hat");

        let requests = app.world().resource::<Requests>();
        assert_eq!(requests.placed, ["cup"]);
        assert_eq!(
            requests.rejected,
            [
                RejectReason::NotAvailable,
                RejectReason::WrongItem,
                RejectReason::NotAvailable
            ]
        );
    }

    #[test]
    fn test_visual_state_transitions() {
        let (mut app, cup, hat) = setup();

        app.world_mut().trigger(SpotActivated {
            item_id: "cup".to_string(),
        });
        app.world_mut().trigger(SpotRevealed {
            item_id: "hat".to_string(),
            instant: true,
        });
        app.update();
        assert!(app.world().entity(cup).contains::<Available>());
        assert!(!app.world().entity(cup).contains::<Hidden>());
        assert!(app.world().entity(hat).contains::<Filled>());

        app.world_mut().trigger(ItemPlaced {
            item_id: "cup".to_string(),
        });
        app.update();
        assert!(app.world().entity(cup).contains::<Filled>());
        assert!(!app.world().entity(cup).contains::<Available>());

        app.world_mut().trigger(SpotHidden {
            item_id: "cup".to_string(),
        });
        app.update();
        assert!(app.world().entity(cup).contains::<Hidden>());
        assert!(!app.world().entity(cup).contains::<Filled>());
        assert!(app.world().entity(hat).contains::<Filled>());

        app.world_mut().trigger(SpotsHidden);
        app.update();
        for spot in [cup, hat] {
            assert!(app.world().entity(spot).contains::<Hidden>());
            assert!(!app.world().entity(spot).contains::<Filled>());
        }
    }

    #[test]
    fn test_despawned_spot_leaves_index() {
        let (mut app, cup, _) = setup();
        app.world_mut().entity_mut(cup).despawn();
        app.update();

        assert_eq!(app.world().resource::<DropSpotIndex>().entity("cup"), None);
    }
}
