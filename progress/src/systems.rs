use {
    crate::{
        store::{self, ProgressSlot},
        AutosaveTimer, GameProgress, ProgressSettings,
    },
    bevy::prelude::*,
    level_assets::ActiveLevel,
    prefs::Prefs,
    progress_events::{
        ItemPlaced, ItemRemoved, MarkPlaced, ProgressCleared, ResetProgress, ResetScope,
        SaveProgress, UnmarkPlaced,
    },
};

/// Resolves the slot of the level being entered and loads its snapshot.
pub fn restore_progress(
    level: Option<Res<ActiveLevel>>,
    prefs: Res<Prefs>,
    settings: Res<ProgressSettings>,
    mut progress: ResMut<GameProgress>,
    mut slot: ResMut<ProgressSlot>,
    mut autosave: ResMut<AutosaveTimer>,
) {
    *slot = match level.as_deref() {
        Some(level) => ProgressSlot::for_level(level),
        None => {
            error!("Entered a level without an ActiveLevel, using the global progress slot");
            ProgressSlot::default()
        }
    };

    let record = store::load_record(prefs.store(), &slot.key);
    *progress = GameProgress::from_record(record);
    if let Some(number) = level.as_deref().and_then(ActiveLevel::level_number) {
        progress.set_current_level(number as i32);
    }
    *autosave = AutosaveTimer::from_settings(&settings);

    info!(
        slot = %slot.key,
        placed = progress.placed_count(),
        "Level progress restored"
    );
}

/// Observer that records placements and persists them right away.
pub fn on_mark_placed(
    trigger: On<MarkPlaced>,
    mut commands: Commands,
    mut progress: ResMut<GameProgress>,
    mut prefs: ResMut<Prefs>,
    slot: Res<ProgressSlot>,
) {
    let MarkPlaced {
        item_id,
        sprite_name,
    } = trigger.event();

    if !progress.mark_placed(item_id, sprite_name) {
        return;
    }

    debug!(%item_id, total = progress.total_items_placed(), "Item placed");
    commands.trigger(ItemPlaced {
        item_id: item_id.clone(),
    });
    store::save_progress(prefs.store_mut(), &slot.key, &mut progress);
}

pub fn on_unmark_placed(
    trigger: On<UnmarkPlaced>,
    mut commands: Commands,
    mut progress: ResMut<GameProgress>,
    mut prefs: ResMut<Prefs>,
    slot: Res<ProgressSlot>,
) {
    let item_id = &trigger.event().item_id;
    if !progress.unmark_placed(item_id) {
        debug!(%item_id, "Undo for an item that is not placed, ignoring");
        return;
    }

    info!(%item_id, "Placement undone");
    commands.trigger(ItemRemoved {
        item_id: item_id.clone(),
    });
    store::save_progress(prefs.store_mut(), &slot.key, &mut progress);
}

pub fn on_save_requested(
    _trigger: On<SaveProgress>,
    mut progress: ResMut<GameProgress>,
    mut prefs: ResMut<Prefs>,
    slot: Res<ProgressSlot>,
) {
    info!(slot = %slot.key, "Manual save triggered");
    store::save_progress(prefs.store_mut(), &slot.key, &mut progress);
}

pub fn on_reset_requested(
    trigger: On<ResetProgress>,
    mut commands: Commands,
    mut progress: ResMut<GameProgress>,
    mut prefs: ResMut<Prefs>,
    slot: Res<ProgressSlot>,
) {
    let ResetProgress(scope) = *trigger.event();
    match scope {
        ResetScope::CurrentLevel => {
            prefs.store_mut().delete(&slot.key);
            prefs.flush_or_log();
            info!(slot = %slot.key, "Level progress reset");
        }
        ResetScope::AllLevels => {
            let deleted = store::delete_all_slots(prefs.store_mut(), &slot);
            info!(deleted, "All level progress reset");
        }
    }

    progress.clear();
    commands.trigger(ProgressCleared { scope });
}

pub fn track_play_time(time: Res<Time>, mut progress: ResMut<GameProgress>) {
    progress.add_play_time(time.delta_secs());
}

pub fn autosave(
    time: Res<Time>,
    mut timer: ResMut<AutosaveTimer>,
    mut progress: ResMut<GameProgress>,
    mut prefs: ResMut<Prefs>,
    slot: Res<ProgressSlot>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        debug!(slot = %slot.key, "Autosave triggered");
        store::save_progress(prefs.store_mut(), &slot.key, &mut progress);
    }
}

pub fn save_on_exit(
    mut progress: ResMut<GameProgress>,
    mut prefs: ResMut<Prefs>,
    slot: Res<ProgressSlot>,
) {
    store::save_progress(prefs.store_mut(), &slot.key, &mut progress);
    info!(slot = %slot.key, "Progress saved on level exit");
}
