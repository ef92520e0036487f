//! Level catalog, level pointer and the transitions between levels.

mod pointer;
pub mod systems;

pub use pointer::{
    is_level_completed, is_level_unlocked, level_completed_key, LevelPointer, CURRENT_LEVEL_KEY,
};

use {
    bevy::{asset::AssetPlugin, prelude::*},
    bevy_common_assets::ron::RonAssetPlugin,
    level_assets::{LevelCatalog, LevelDefinition},
    serde::Deserialize,
    states::GameState,
};

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    /// Catalog asset, relative to the assets folder.
    pub catalog_path: String,
    /// Load the next level on its own after a level is completed.
    pub auto_advance: bool,
    /// Time the completion screen stays up before auto advancing.
    pub advance_delay_secs: f32,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            catalog_path: "catalog.levels.ron".to_string(),
            auto_advance: true,
            advance_delay_secs: 3.0,
        }
    }
}

/// Every level of the game in play order; level `n` is `levels[n - 1]`.
#[derive(Resource, Debug, Clone, Default)]
pub struct LevelLibrary {
    pub levels: Vec<LevelDefinition>,
}

impl LevelLibrary {
    pub fn get(&self, level: u32) -> Option<&LevelDefinition> {
        let index = usize::try_from(level).ok()?.checked_sub(1)?;
        self.levels.get(index)
    }

    pub fn len(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[derive(Resource)]
pub struct LevelCatalogHandle(pub Handle<LevelCatalog>);

/// Counts down on the completion screen before the next level loads.
#[derive(Resource, Debug)]
pub struct AdvanceTimer {
    pub next: u32,
    pub timer: Timer,
}

pub struct LevelsPlugin;

impl Plugin for LevelsPlugin {
    fn build(&self, app: &mut App) {
        if app.is_plugin_added::<AssetPlugin>() {
            app.add_plugins(RonAssetPlugin::<LevelCatalog>::new(&["levels.ron"]))
                .add_systems(Startup, systems::start_loading_catalog)
                .add_systems(
                    Update,
                    systems::check_catalog_loaded.run_if(in_state(GameState::Loading)),
                );
        }

        app.init_resource::<LevelSettings>()
            .init_resource::<prefs::Prefs>()
            .init_resource::<LevelLibrary>()
            .init_resource::<LevelPointer>()
            .add_systems(OnExit(GameState::Loading), systems::restore_level_pointer)
            .add_systems(
                Update,
                systems::tick_advance_timer.run_if(in_state(GameState::LevelComplete)),
            )
            .add_systems(OnExit(GameState::LevelComplete), systems::clean_up_advance_timer)
            .add_observer(systems::on_load_level)
            .add_observer(systems::on_load_level_selection)
            .add_observer(systems::on_level_completed)
            .add_observer(systems::on_reset_levels);
    }
}
