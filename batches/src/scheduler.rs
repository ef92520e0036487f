use {
    crate::plan::{count_placed, resume_point, BatchPlan, ResumePoint},
    bevy::prelude::*,
    progress::PlacementLookup,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    #[default]
    AwaitingInit,
    /// The current batch is revealed and accepts placements.
    Active,
    /// A batch just completed; the next one is held back by the gate.
    AwaitingGate,
    /// Every batch is full. Terminal for the session.
    AllComplete,
}

/// Snapshot for progress bars and the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
    pub placed_in_batch: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// Not in the active batch, or no batch is active.
    Ignored,
    Counted { batch: usize, placed: usize },
    BatchFilled { batch: usize, is_last: bool },
}

/// Decides which targets are available and when batches complete.
///
/// Only counts; it never reads or writes persistence itself. Placement state
/// comes in through [`PlacementLookup`].
#[derive(Resource, Debug, Default)]
pub struct BatchScheduler {
    plan: BatchPlan,
    targets: Vec<String>,
    phase: BatchPhase,
    current_batch: usize,
    placed_in_batch: usize,
    /// Completed batch whose gate has not been released yet.
    held_by_gate: Option<usize>,
}

impl BatchScheduler {
    pub fn new(plan: BatchPlan, targets: Vec<String>) -> Self {
        Self {
            plan,
            targets,
            ..default()
        }
    }

    pub fn plan(&self) -> &BatchPlan {
        &self.plan
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn current_batch(&self) -> usize {
        self.current_batch
    }

    pub fn placed_in_batch(&self) -> usize {
        self.placed_in_batch
    }

    /// Recomputes the position from the placed set. Valid from any phase;
    /// used on level load and after a progress reset.
    pub fn initialize(&mut self, placements: &impl PlacementLookup) -> BatchPhase {
        self.held_by_gate = None;
        match resume_point(&self.plan, &self.targets, placements) {
            ResumePoint::Batch { index, placed } => {
                self.phase = BatchPhase::Active;
                self.current_batch = index;
                self.placed_in_batch = placed;
            }
            ResumePoint::AllComplete => {
                self.phase = BatchPhase::AllComplete;
                self.current_batch = self.plan.len();
                self.placed_in_batch = 0;
            }
        }
        self.phase
    }

    /// Counts a placement against the active batch.
    ///
    /// The counter is rebuilt from the placed set, so a replayed event or an
    /// item placed again after an undo is never counted twice.
    pub fn record_placement(
        &mut self,
        item_id: &str,
        placements: &impl PlacementLookup,
    ) -> PlacementOutcome {
        if self.phase != BatchPhase::Active || !self.in_current_batch(item_id) {
            return PlacementOutcome::Ignored;
        }

        self.placed_in_batch =
            count_placed(&self.plan, self.current_batch, &self.targets, placements);
        self.settle_current_batch()
    }

    /// Lowers the active batch's counter after an undo. Returns `true` when the
    /// target belongs to the active batch and can be placed again.
    ///
    /// The batch position never moves backward: undoing a target of a
    /// completed batch leaves it unplaced until the level is entered again.
    pub fn record_removal(&mut self, item_id: &str, placements: &impl PlacementLookup) -> bool {
        if self.phase != BatchPhase::Active || !self.in_current_batch(item_id) {
            return false;
        }

        self.placed_in_batch =
            count_placed(&self.plan, self.current_batch, &self.targets, placements);
        true
    }

    /// Opens the batch held back by the gate.
    ///
    /// Targets of that batch placed earlier are counted right away; if they
    /// already fill it, the batch completes immediately.
    pub fn open_current_batch(&mut self, placements: &impl PlacementLookup) -> PlacementOutcome {
        if self.phase != BatchPhase::AwaitingGate {
            return PlacementOutcome::Ignored;
        }

        self.phase = BatchPhase::Active;
        self.placed_in_batch =
            count_placed(&self.plan, self.current_batch, &self.targets, placements);
        self.settle_current_batch()
    }

    /// Completes the active batch once its counter reaches the batch size.
    fn settle_current_batch(&mut self) -> PlacementOutcome {
        let batch = self.current_batch;
        if self.placed_in_batch < self.plan.size(batch) {
            return PlacementOutcome::Counted {
                batch,
                placed: self.placed_in_batch,
            };
        }

        let is_last = self.plan.is_last(batch);
        self.placed_in_batch = 0;
        if is_last {
            self.phase = BatchPhase::AllComplete;
            self.current_batch = self.plan.len();
        } else {
            self.phase = BatchPhase::AwaitingGate;
            self.current_batch = batch + 1;
        }
        PlacementOutcome::BatchFilled { batch, is_last }
    }

    /// Marks `batch` as waiting on a gate release.
    pub fn hold_for_gate(&mut self, batch: usize) {
        self.held_by_gate = Some(batch);
    }

    /// Clears the hold if it belongs to `batch`. Releases for anything else
    /// (already reset, replaced by a reload) return `false`.
    pub fn release_gate(&mut self, batch: usize) -> bool {
        if self.held_by_gate == Some(batch) {
            self.held_by_gate = None;
            true
        } else {
            false
        }
    }

    pub fn is_held_by_gate(&self) -> bool {
        self.held_by_gate.is_some()
    }

    pub fn progress(&self) -> BatchProgress {
        BatchProgress {
            current: self.current_batch,
            total: self.plan.len(),
            placed_in_batch: self.placed_in_batch,
            batch_size: self.plan.size(self.current_batch),
        }
    }

    /// Ids of the targets in `batch`, in level order.
    pub fn batch_targets(&self, batch: usize) -> &[String] {
        self.plan
            .range(batch)
            .and_then(|range| self.targets.get(range))
            .unwrap_or_default()
    }

    /// Targets a player can place right now.
    pub fn available_targets<'a>(&'a self, placements: &impl PlacementLookup) -> Vec<&'a str> {
        if self.phase != BatchPhase::Active {
            return Vec::new();
        }
        self.batch_targets(self.current_batch)
            .iter()
            .filter(|id| !placements.is_placed(id))
            .map(String::as_str)
            .collect()
    }

    pub fn is_placeable(&self, item_id: &str, placements: &impl PlacementLookup) -> bool {
        self.phase == BatchPhase::Active
            && self.in_current_batch(item_id)
            && !placements.is_placed(item_id)
    }

    /// All targets in level order.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    fn in_current_batch(&self, item_id: &str) -> bool {
        self.batch_targets(self.current_batch)
            .iter()
            .any(|id| id == item_id)
    }
}
