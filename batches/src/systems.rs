use {
    crate::{BatchPhase, BatchPlan, BatchScheduler, PlacementOutcome},
    ad_gate::{CompletionGate, GateReleased, GateRequested, GateSettings},
    bevy::prelude::*,
    drop_spots::DropSpotIndex,
    level_assets::{ActiveLevel, BatchLayout},
    level_events::{
        BatchCompleted, BatchRevealed, LevelCompleted, SpotActivated, SpotHidden, SpotRevealed,
        SpotsHidden,
    },
    progress::{GameProgress, PlacementLookup},
    progress_events::{ItemPlaced, ItemRemoved, ProgressCleared},
};

/// Everything needed to move the level forward after a batch fills.
struct Progression<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    scheduler: &'a mut BatchScheduler,
    gate: &'a mut CompletionGate,
    progress: &'a GameProgress,
    level: Option<u32>,
}

impl Progression<'_, '_, '_> {
    fn finish_batch(&mut self, batch: usize, is_last: bool) {
        info!(batch, is_last, "Batch completed");
        self.commands.trigger(BatchCompleted {
            index: batch,
            is_last,
        });

        if self.gate.should_gate(batch) {
            self.scheduler.hold_for_gate(batch);
            self.commands.trigger(GateRequested {
                completed_batch: batch,
            });
        } else {
            self.continue_after_batch();
        }
    }

    fn continue_after_batch(&mut self) {
        if self.scheduler.phase() == BatchPhase::AllComplete {
            info!(level = ?self.level, "Level completed");
            self.commands.trigger(LevelCompleted { level: self.level });
            return;
        }

        match self.scheduler.open_current_batch(self.progress) {
            PlacementOutcome::BatchFilled { batch, is_last } => {
                debug!(batch, "Opened batch was already full");
                self.finish_batch(batch, is_last);
            }
            _ => reveal_current_batch(self.commands, self.scheduler, self.progress),
        }
    }
}

fn reveal_current_batch(
    commands: &mut Commands,
    scheduler: &BatchScheduler,
    progress: &GameProgress,
) {
    if scheduler.phase() != BatchPhase::Active {
        return;
    }

    for item_id in scheduler.available_targets(progress) {
        commands.trigger(SpotActivated {
            item_id: item_id.to_string(),
        });
    }
    let batch = scheduler.current_batch();
    debug!(batch, "Batch revealed");
    commands.trigger(BatchRevealed { index: batch });
}

/// Hides every spot, shows placed ones in their final state and activates the
/// unplaced targets of the active batch.
fn apply_layout(commands: &mut Commands, scheduler: &BatchScheduler, progress: &GameProgress) {
    commands.trigger(SpotsHidden);
    for item_id in scheduler.targets().iter().filter(|id| progress.is_placed(id)) {
        commands.trigger(SpotRevealed {
            item_id: item_id.clone(),
            instant: true,
        });
    }
    reveal_current_batch(commands, scheduler, progress);
}

/// Recomputes the position from the placed set and reseeds the gate count.
fn restart(
    scheduler: &mut BatchScheduler,
    gate: &mut CompletionGate,
    settings: &GateSettings,
    progress: &GameProgress,
) {
    let phase = scheduler.initialize(progress);
    let completed = scheduler.current_batch().min(scheduler.plan().len());
    *gate = CompletionGate::new(settings).seeded(completed as u32);

    let batch_progress = scheduler.progress();
    info!(
        ?phase,
        batch = batch_progress.current,
        total = batch_progress.total,
        placed = batch_progress.placed_in_batch,
        "Batches scheduled"
    );
}

fn report_plan(plan: &BatchPlan, available: usize) {
    if plan.is_mismatched() {
        warn!(
            configured = plan.required_targets(),
            available, "Batch layout does not match the level's drop spots"
        );
    }
    let unreachable = plan.unreachable_targets();
    if unreachable > 0 {
        error!(unreachable, "Drop spots past the configured batches can never be placed");
    }
}

pub fn initialize_batches(
    mut commands: Commands,
    level: Option<Res<ActiveLevel>>,
    index: Res<DropSpotIndex>,
    progress: Res<GameProgress>,
    settings: Res<GateSettings>,
    mut gate: ResMut<CompletionGate>,
    mut scheduler: ResMut<BatchScheduler>,
) {
    let layout = match level.as_deref() {
        Some(level) => level.definition.batches.clone(),
        None => {
            error!("Entered a level without an ActiveLevel, using the default batch layout");
            BatchLayout::default()
        }
    };

    let plan = BatchPlan::new(&layout, index.len());
    report_plan(&plan, index.len());

    *scheduler = BatchScheduler::new(plan, index.ordered_ids().to_vec());
    restart(&mut scheduler, &mut gate, &settings, &progress);
    apply_layout(&mut commands, &scheduler, &progress);
}

/// Observer counting placements against the active batch.
pub fn on_item_placed(
    trigger: On<ItemPlaced>,
    mut commands: Commands,
    level: Option<Res<ActiveLevel>>,
    progress: Res<GameProgress>,
    mut gate: ResMut<CompletionGate>,
    mut scheduler: ResMut<BatchScheduler>,
) {
    let item_id = &trigger.event().item_id;
    match scheduler.record_placement(item_id, &*progress) {
        PlacementOutcome::Ignored => {
            trace!(%item_id, "Placement outside the active batch");
        }
        PlacementOutcome::Counted { batch, placed } => {
            debug!(%item_id, batch, placed, "Placement counted");
        }
        PlacementOutcome::BatchFilled { batch, is_last } => {
            Progression {
                commands: &mut commands,
                scheduler: &mut *scheduler,
                gate: &mut *gate,
                progress: &*progress,
                level: level.as_deref().and_then(ActiveLevel::level_number),
            }
            .finish_batch(batch, is_last);
        }
    }
}

/// An undone target only accepts drops again while its batch is active.
pub fn on_item_removed(
    trigger: On<ItemRemoved>,
    mut commands: Commands,
    progress: Res<GameProgress>,
    mut scheduler: ResMut<BatchScheduler>,
) {
    if scheduler.phase() == BatchPhase::AwaitingInit {
        return;
    }

    let item_id = trigger.event().item_id.clone();
    if scheduler.record_removal(&item_id, &*progress) {
        debug!(%item_id, placed = scheduler.placed_in_batch(), "Undo in the active batch");
        commands.trigger(SpotActivated { item_id });
    } else {
        debug!(%item_id, "Undo outside the active batch, spot stays hidden");
        commands.trigger(SpotHidden { item_id });
    }
}

pub fn on_gate_released(
    trigger: On<GateReleased>,
    mut commands: Commands,
    level: Option<Res<ActiveLevel>>,
    progress: Res<GameProgress>,
    mut gate: ResMut<CompletionGate>,
    mut scheduler: ResMut<BatchScheduler>,
) {
    let GateReleased {
        completed_batch,
        outcome,
    } = trigger.event();

    if !scheduler.release_gate(*completed_batch) {
        debug!(completed_batch, "Release for a batch that is not held, ignoring");
        return;
    }

    debug!(completed_batch, ?outcome, "Continuing after gate");
    Progression {
        commands: &mut commands,
        scheduler: &mut *scheduler,
        gate: &mut *gate,
        progress: &*progress,
        level: level.as_deref().and_then(ActiveLevel::level_number),
    }
    .continue_after_batch();
}

/// After a reset every target goes back to unplaced and the level restarts
/// from the first batch.
pub fn on_progress_cleared(
    trigger: On<ProgressCleared>,
    mut commands: Commands,
    progress: Res<GameProgress>,
    settings: Res<GateSettings>,
    mut gate: ResMut<CompletionGate>,
    mut scheduler: ResMut<BatchScheduler>,
) {
    if scheduler.phase() == BatchPhase::AwaitingInit {
        return;
    }

    info!(scope = ?trigger.event().scope, "Rescheduling batches after reset");
    restart(&mut scheduler, &mut gate, &settings, &progress);
    apply_layout(&mut commands, &scheduler, &progress);
}

pub fn clean_up_batches(mut scheduler: ResMut<BatchScheduler>) {
    *scheduler = BatchScheduler::default();
}
