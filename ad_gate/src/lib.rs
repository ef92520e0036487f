//! Ad-gated continuation between batches.
//!
//! The batch scheduler asks [`CompletionGate`] whether a completed batch is
//! gated. If it is, it triggers [`GateRequested`] and holds the next reveal
//! until [`GateReleased`] arrives. Release is guaranteed: the ad closing,
//! failing, being unavailable, or the timeout all release the gate.

mod policy;
mod service;

pub use policy::{CompletionGate, GateSettings};
pub use service::{AdCallbacks, AdService, AdSignal, AdSignalQueue, Ads};

use {
    bevy::prelude::*,
    states::GameState,
    system_schedule::GameSchedule,
};

// --- Events ---

/// Request to hold progression behind an ad.
///
/// # Observers
/// - `on_gate_requested`: shows an ad through [`Ads`] or releases at once.
#[derive(Event, Debug, Clone)]
pub struct GateRequested {
    pub completed_batch: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    AdClosed { completed: bool },
    AdFailed(String),
    /// No ad service installed, or none ready to show.
    Unavailable,
    TimedOut,
    /// A newer request arrived while this one was still waiting.
    Superseded,
}

/// The gate for `completed_batch` is open; progression may continue.
#[derive(Event, Debug, Clone)]
pub struct GateReleased {
    pub completed_batch: usize,
    pub outcome: GateOutcome,
}

/// The player watched an ad to the end.
#[derive(Event, Debug, Clone)]
pub struct AdRewarded {
    pub completed_batch: usize,
}

// --- Resources ---

#[derive(Debug)]
pub struct GateTicket {
    pub completed_batch: usize,
    pub timeout: Timer,
}

/// The gate currently waiting on an ad, if any.
#[derive(Resource, Debug, Default)]
pub struct PendingGate(pub Option<GateTicket>);

impl PendingGate {
    pub fn is_waiting(&self) -> bool {
        self.0.is_some()
    }
}

// --- Plugin ---

pub struct AdGatePlugin;

impl Plugin for AdGatePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GateSettings>()
            .init_resource::<CompletionGate>()
            .init_resource::<PendingGate>()
            .init_resource::<AdSignalQueue>()
            .add_systems(
                Update,
                resolve_pending_gate
                    .in_set(GameSchedule::ResolveGate)
                    .run_if(in_state(GameState::InLevel)),
            )
            .add_observer(on_gate_requested)
            .add_systems(OnExit(GameState::InLevel), clean_up_gate);
    }
}

fn release(commands: &mut Commands, completed_batch: usize, outcome: GateOutcome) {
    info!(completed_batch, ?outcome, "Gate released");
    commands.trigger(GateReleased {
        completed_batch,
        outcome,
    });
}

pub fn on_gate_requested(
    trigger: On<GateRequested>,
    mut commands: Commands,
    ads: Option<ResMut<Ads>>,
    queue: Res<AdSignalQueue>,
    settings: Res<GateSettings>,
    mut pending: ResMut<PendingGate>,
) {
    let completed_batch = trigger.event().completed_batch;

    if let Some(previous) = pending.0.take() {
        warn!(
            previous = previous.completed_batch,
            "Gate requested while another was waiting"
        );
        release(&mut commands, previous.completed_batch, GateOutcome::Superseded);
    }

    let Some(mut ads) = ads.filter(|ads| ads.is_ready()) else {
        debug!(completed_batch, "No ad ready, skipping gate");
        release(&mut commands, completed_batch, GateOutcome::Unavailable);
        return;
    };

    // Callbacks of an earlier, timed out ad must not release this gate.
    let stale = queue.drain();
    if !stale.is_empty() {
        debug!(count = stale.len(), "Discarding stale ad signals");
    }

    pending.0 = Some(GateTicket {
        completed_batch,
        timeout: Timer::from_seconds(settings.timeout_secs.max(0.0), TimerMode::Once),
    });
    info!(completed_batch, "Showing ad before next batch");
    ads.request_show(AdCallbacks::new(queue.clone()));
}

/// Drains ad callbacks and enforces the timeout of the waiting gate.
pub fn resolve_pending_gate(
    time: Res<Time>,
    mut commands: Commands,
    queue: Res<AdSignalQueue>,
    mut pending: ResMut<PendingGate>,
) {
    for signal in queue.drain() {
        let Some(ticket) = pending.0.as_ref() else {
            debug!(?signal, "Ad signal without a waiting gate, ignoring");
            continue;
        };
        let completed_batch = ticket.completed_batch;

        let outcome = match signal {
            AdSignal::Opened => {
                debug!(completed_batch, "Ad opened");
                continue;
            }
            AdSignal::Rewarded => {
                commands.trigger(AdRewarded { completed_batch });
                continue;
            }
            AdSignal::Closed { completed } => GateOutcome::AdClosed { completed },
            AdSignal::Failed(reason) => {
                warn!(completed_batch, %reason, "Ad failed to show");
                GateOutcome::AdFailed(reason)
            }
        };

        pending.0 = None;
        release(&mut commands, completed_batch, outcome);
    }

    let Some(ticket) = pending.0.as_mut() else {
        return;
    };
    if ticket.timeout.tick(time.delta()).is_finished() {
        let completed_batch = ticket.completed_batch;
        pending.0 = None;
        warn!(completed_batch, "Ad did not report back in time, continuing");
        release(&mut commands, completed_batch, GateOutcome::TimedOut);
    }
}

pub fn clean_up_gate(mut pending: ResMut<PendingGate>, queue: Res<AdSignalQueue>) {
    pending.0 = None;
    queue.drain();
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        bevy::{state::app::StatesPlugin, time::TimeUpdateStrategy},
        std::time::Duration,
    };

    /// What the fake SDK does when asked to show.
    #[derive(Clone, Copy)]
    enum Script {
        CloseImmediately,
        FailImmediately,
        NeverRespond,
    }

    struct FakeAds {
        ready: bool,
        script: Script,
    }

    impl AdService for FakeAds {
        fn is_ready(&self) -> bool {
            self.ready
        }

        fn request_show(&mut self, callbacks: AdCallbacks) {
            match self.script {
                Script::CloseImmediately => {
                    callbacks.opened();
                    callbacks.rewarded();
                    callbacks.closed(true);
                }
                Script::FailImmediately => callbacks.failed("no fill"),
                Script::NeverRespond => {}
            }
        }
    }

    #[derive(Resource, Default)]
    struct Released(Vec<GateReleased>);

    fn setup(ads: Option<FakeAds>) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<GameState>()
            .add_plugins(AdGatePlugin)
            .insert_resource(GateSettings {
                timeout_secs: 0.5,
                ..default()
            })
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .init_resource::<Released>()
            .add_observer(|trigger: On<GateReleased>, mut released: ResMut<Released>| {
                released.0.push(trigger.event().clone());
            });
        if let Some(ads) = ads {
            app.insert_resource(Ads::new(ads));
        }

        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(GameState::InLevel);
        app.update();
        app
    }

    fn outcomes(app: &App) -> Vec<GateOutcome> {
        app.world()
            .resource::<Released>()
            .0
            .iter()
            .map(|released| released.outcome.clone())
            .collect()
    }

    #[test]
    fn test_missing_service_releases_immediately() {
        let mut app = setup(None);
        app.world_mut().trigger(GateRequested { completed_batch: 1 });
        app.update();

        assert_eq!(outcomes(&app), [GateOutcome::Unavailable]);
        assert!(!app.world().resource::<PendingGate>().is_waiting());
    }

    #[test]
    fn test_not_ready_service_releases_immediately() {
        let mut app = setup(Some(FakeAds {
            ready: false,
            script: Script::CloseImmediately,
        }));
        app.world_mut().trigger(GateRequested { completed_batch: 1 });
        app.update();

        assert_eq!(outcomes(&app), [GateOutcome::Unavailable]);
    }

    #[test]
    fn test_closed_ad_releases_gate() {
        let mut app = setup(Some(FakeAds {
            ready: true,
            script: Script::CloseImmediately,
        }));
        app.world_mut().trigger(GateRequested { completed_batch: 3 });
        assert!(app.world().resource::<PendingGate>().is_waiting());
        app.update();

        let released = &app.world().resource::<Released>().0;
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].completed_batch, 3);
        assert_eq!(
            released[0].outcome,
            GateOutcome::AdClosed { completed: true }
        );
    }

    #[test]
    fn test_failed_ad_releases_gate() {
        let mut app = setup(Some(FakeAds {
            ready: true,
            script: Script::FailImmediately,
        }));
        app.world_mut().trigger(GateRequested { completed_batch: 1 });
        app.update();

        assert_eq!(
            outcomes(&app),
            [GateOutcome::AdFailed("no fill".to_string())]
        );
    }

    #[test]
    fn test_silent_ad_times_out() {
        let mut app = setup(Some(FakeAds {
            ready: true,
            script: Script::NeverRespond,
        }));
        app.world_mut().trigger(GateRequested { completed_batch: 1 });
        app.update();
        assert!(outcomes(&app).is_empty());

        for _ in 0..10 {
            app.update();
        }

        assert_eq!(outcomes(&app), [GateOutcome::TimedOut]);
        assert!(!app.world().resource::<PendingGate>().is_waiting());
    }

    #[test]
    fn test_late_signal_after_timeout_is_ignored() {
        let mut app = setup(Some(FakeAds {
            ready: true,
            script: Script::NeverRespond,
        }));
        app.world_mut().trigger(GateRequested { completed_batch: 1 });
        for _ in 0..10 {
            app.update();
        }

        let queue = app.world().resource::<AdSignalQueue>().clone();
        AdCallbacks::new(queue).closed(false);
        app.update();

        assert_eq!(outcomes(&app), [GateOutcome::TimedOut]);
    }
}
