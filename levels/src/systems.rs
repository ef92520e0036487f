use {
    crate::{
        is_level_unlocked, AdvanceTimer, LevelCatalogHandle, LevelLibrary, LevelPointer,
        LevelSettings,
    },
    bevy::prelude::*,
    level_assets::{ActiveLevel, LevelCatalog},
    level_events::{LevelAdvanced, LevelCompleted, LoadLevel, LoadLevelSelection, ResetLevels},
    prefs::Prefs,
    progress::MAX_LEVEL_SLOTS,
    states::GameState,
};

// --- Catalog loading ---

pub fn start_loading_catalog(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<LevelSettings>,
) {
    info!(path = %settings.catalog_path, "started loading level catalog");
    let handle = asset_server.load(settings.catalog_path.clone());
    commands.insert_resource(LevelCatalogHandle(handle));
}

pub fn check_catalog_loaded(
    handle: Option<Res<LevelCatalogHandle>>,
    asset_server: Res<AssetServer>,
    catalogs: Res<Assets<LevelCatalog>>,
    mut library: ResMut<LevelLibrary>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(handle) = handle else {
        return;
    };

    if let Some(catalog) = catalogs.get(&handle.0) {
        library.levels = catalog.levels.clone();
        info!(levels = library.len(), "level catalog loaded");
        next_state.set(GameState::LevelSelection);
    } else if asset_server.load_state(handle.0.id()).is_failed() {
        error!("Level catalog failed to load, continuing without levels");
        next_state.set(GameState::LevelSelection);
    }
}

pub fn restore_level_pointer(
    library: Res<LevelLibrary>,
    prefs: Res<Prefs>,
    mut pointer: ResMut<LevelPointer>,
) {
    *pointer = LevelPointer::load(prefs.store(), library.len());
    info!(
        current = pointer.current_level(),
        total = pointer.total_levels(),
        "Level pointer restored"
    );
}

// --- Scene loader ---

pub fn on_load_level(
    trigger: On<LoadLevel>,
    mut commands: Commands,
    library: Res<LevelLibrary>,
    mut prefs: ResMut<Prefs>,
    mut pointer: ResMut<LevelPointer>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let level = trigger.event().level;
    let Some(definition) = library.get(level) else {
        warn!(level, total = library.len(), "Requested level does not exist");
        return;
    };
    if !is_level_unlocked(prefs.store(), level) {
        warn!(level, "Requested level is locked");
        return;
    }

    info!(level, scene = %definition.scene, "Loading level");
    commands.insert_resource(ActiveLevel::new(definition.clone()));
    pointer.set_current(prefs.store_mut(), level);
    next_state.set(GameState::InLevel);
}

pub fn on_load_level_selection(
    _trigger: On<LoadLevelSelection>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    debug!("Returning to level selection");
    next_state.set(GameState::LevelSelection);
}

// --- Level end ---

/// Marks the finished level completed and moves the pointer on.
pub fn on_level_completed(
    trigger: On<LevelCompleted>,
    mut commands: Commands,
    settings: Res<LevelSettings>,
    mut prefs: ResMut<Prefs>,
    mut pointer: ResMut<LevelPointer>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let completed = match trigger.event().level {
        Some(level) => level,
        None => {
            warn!("Completed scene has no level number, using the level pointer");
            pointer.current_level()
        }
    };

    let next = pointer.advance_to_next(prefs.store_mut(), completed);
    info!(completed, next, "Level completed, pointer advanced");
    commands.trigger(LevelAdvanced { completed, next });

    if settings.auto_advance {
        commands.insert_resource(AdvanceTimer {
            next,
            timer: Timer::from_seconds(settings.advance_delay_secs.max(0.0), TimerMode::Once),
        });
    }
    next_state.set(GameState::LevelComplete);
}

pub fn tick_advance_timer(
    time: Res<Time>,
    mut commands: Commands,
    timer: Option<ResMut<AdvanceTimer>>,
) {
    let Some(mut advance) = timer else {
        return;
    };
    if advance.timer.tick(time.delta()).is_finished() {
        commands.remove_resource::<AdvanceTimer>();
        commands.trigger(LoadLevel {
            level: advance.next,
        });
    }
}

pub fn clean_up_advance_timer(mut commands: Commands) {
    commands.remove_resource::<AdvanceTimer>();
}

pub fn on_reset_levels(
    _trigger: On<ResetLevels>,
    mut prefs: ResMut<Prefs>,
    mut pointer: ResMut<LevelPointer>,
) {
    let deleted = pointer.reset_levels(prefs.store_mut(), MAX_LEVEL_SLOTS);
    info!(deleted, "Level completion reset");
}
