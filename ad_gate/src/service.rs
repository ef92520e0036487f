use {
    bevy::prelude::*,
    std::sync::{Arc, Mutex, PoisonError},
};

/// What an ad SDK reports back after `request_show`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdSignal {
    Opened,
    Rewarded,
    Closed { completed: bool },
    Failed(String),
}

/// Thread-safe inbox for ad callbacks. SDKs may call back from their own
/// threads; the queue is drained on the main schedule every frame.
#[derive(Resource, Clone, Default)]
pub struct AdSignalQueue(Arc<Mutex<Vec<AdSignal>>>);

impl AdSignalQueue {
    pub fn push(&self, signal: AdSignal) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
    }

    pub fn drain(&self) -> Vec<AdSignal> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Callbacks handed to the ad service for one show request.
#[derive(Clone)]
pub struct AdCallbacks {
    queue: AdSignalQueue,
}

impl AdCallbacks {
    pub fn new(queue: AdSignalQueue) -> Self {
        Self { queue }
    }

    pub fn opened(&self) {
        self.queue.push(AdSignal::Opened);
    }

    pub fn rewarded(&self) {
        self.queue.push(AdSignal::Rewarded);
    }

    pub fn closed(&self, completed: bool) {
        self.queue.push(AdSignal::Closed { completed });
    }

    pub fn failed(&self, reason: impl Into<String>) {
        self.queue.push(AdSignal::Failed(reason.into()));
    }
}

/// Interstitial ad provider.
pub trait AdService: Send + Sync + 'static {
    fn is_ready(&self) -> bool;
    /// Shows an ad. Every request must eventually end in `closed` or `failed`,
    /// but callers do not rely on it.
    fn request_show(&mut self, callbacks: AdCallbacks);
}

/// The installed ad provider. Without it, gates open immediately.
#[derive(Resource, Deref, DerefMut)]
pub struct Ads(pub Box<dyn AdService>);

impl Ads {
    pub fn new(service: impl AdService) -> Self {
        Self(Box::new(service))
    }
}
