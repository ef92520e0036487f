mod settings;

pub use settings::{SettingsFile, SETTINGS_PATH};

use {
    ad_gate::AdGatePlugin,
    batches::BatchesPlugin,
    bevy::prelude::*,
    drop_spot_components::DropSpot,
    drop_spots::DropSpotsPlugin,
    level_assets::ActiveLevel,
    levels::LevelsPlugin,
    prefs::{JsonFilePrefs, Prefs},
    progress::ProgressPlugin,
    states::GameState,
    system_schedule::{LevelLoad, SchedulePlugin},
};

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        let settings = SettingsFile::load(SETTINGS_PATH);
        let prefs = JsonFilePrefs::open(&settings.progress.prefs_path);

        app.init_state::<GameState>()
            .insert_resource(Prefs::new(prefs))
            .add_plugins((
                SchedulePlugin,
                ProgressPlugin,
                DropSpotsPlugin,
                AdGatePlugin,
                BatchesPlugin,
                LevelsPlugin,
            ))
            .add_systems(
                OnEnter(GameState::InLevel),
                spawn_level_spots.in_set(LevelLoad::SpawnSpots),
            );

        settings.insert_into(app);
    }
}

/// Spawns one drop spot per target of the active level, in level order.
fn spawn_level_spots(mut commands: Commands, level: Option<Res<ActiveLevel>>) {
    let Some(level) = level else {
        error!("Entered a level without an ActiveLevel, no drop spots spawned");
        return;
    };

    for (order, spot) in level.definition.spots.iter().enumerate() {
        commands.spawn((
            Name::new(format!("DropSpot {}", spot.item_id)),
            DropSpot::new(spot.item_id.clone(), order),
        ));
    }
    info!(scene = %level.scene(), spots = level.definition.spots.len(), "Level spots spawned");
}
