use {bevy::prelude::*, serde::Deserialize};

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    pub enabled: bool,
    /// Gate every Nth completed batch. `0` or less never gates.
    pub frequency: i32,
    /// Never gate right after the first batch of a level.
    pub skip_first_batch: bool,
    /// Upper bound on waiting for the ad to report back.
    pub timeout_secs: f32,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: 2,
            skip_first_batch: true,
            timeout_secs: 60.0,
        }
    }
}

/// Decides after each completed batch whether the next reveal waits for an ad.
///
/// Counting uses completed batches rather than batch indices so custom layouts
/// with uneven batch sizes still gate at a steady rhythm.
#[derive(Resource, Debug, Clone, Default)]
pub struct CompletionGate {
    enabled: bool,
    frequency: i32,
    skip_first_batch: bool,
    completed: u32,
}

impl CompletionGate {
    pub fn new(settings: &GateSettings) -> Self {
        Self {
            enabled: settings.enabled,
            frequency: settings.frequency,
            skip_first_batch: settings.skip_first_batch,
            completed: 0,
        }
    }

    /// Starts the count at the number of batches finished in earlier sessions.
    pub fn seeded(mut self, already_completed: u32) -> Self {
        self.completed = already_completed;
        self
    }

    pub fn completed_count(&self) -> u32 {
        self.completed
    }

    /// Counts the batch that just completed and reports whether to gate.
    pub fn should_gate(&mut self, completed_batch: usize) -> bool {
        self.completed += 1;

        if !self.enabled || self.frequency <= 0 {
            return false;
        }
        if self.skip_first_batch && completed_batch == 0 {
            return false;
        }
        self.completed % self.frequency as u32 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(enabled: bool, frequency: i32, skip_first_batch: bool) -> CompletionGate {
        CompletionGate::new(&GateSettings {
            enabled,
            frequency,
            skip_first_batch,
            ..default()
        })
    }

    #[test]
    fn test_every_second_batch_skipping_first() {
        let mut gate = gate(true, 2, true);
        assert!(!gate.should_gate(0));
        assert!(gate.should_gate(1));
        assert!(!gate.should_gate(2));
        assert_eq!(gate.completed_count(), 3);
    }

    #[test]
    fn test_skip_first_still_counts() {
        let mut gate = gate(true, 1, true);
        assert!(!gate.should_gate(0));
        assert!(gate.should_gate(1));
        assert!(gate.should_gate(2));
    }

    #[test]
    fn test_non_positive_frequency_never_gates() {
        for frequency in [0, -3] {
            let mut gate = gate(true, frequency, false);
            assert!((0..6).all(|batch| !gate.should_gate(batch)));
        }
    }

    #[test]
    fn test_disabled_never_gates() {
        let mut gate = gate(false, 1, false);
        assert!((0..4).all(|batch| !gate.should_gate(batch)));
        assert_eq!(gate.completed_count(), 4);
    }

    #[test]
    fn test_seeded_count_carries_rhythm_across_sessions() {
        // Batches 0 and 1 were finished before a restart.
        let mut gate = gate(true, 3, false).seeded(2);
        assert!(gate.should_gate(2));
        assert!(!gate.should_gate(3));
    }
}
