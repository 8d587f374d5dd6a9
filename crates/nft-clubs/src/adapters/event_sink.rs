//! # Event Sink Adapters
//!
//! `BroadcastEventSink` fans committed events out to any number of observers
//! over `tokio::sync::broadcast`. `RecordingEventSink` keeps them in order.

use crate::events::{ClubEvent, EventTopic};
use crate::ports::outbound::EventSink;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Maximum events buffered per observer before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Multi-observer event fan-out.
pub struct BroadcastEventSink {
    sender: broadcast::Sender<ClubEvent>,
    events_published: AtomicU64,
}

impl BroadcastEventSink {
    /// Create a sink with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a sink with the given per-observer capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
        }
    }

    /// Subscribe to every future event.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClubEvent> {
        self.sender.subscribe()
    }

    /// Number of live observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events published, observed or not.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for BroadcastEventSink {
    fn publish(&self, event: ClubEvent) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let topic = event.topic();
        match self.sender.send(event) {
            Ok(receivers) => debug!(?topic, receivers, "Event published"),
            // No observers is normal; the event is simply dropped.
            Err(_) => trace!(?topic, "Event published with no observers"),
        }
    }
}

/// Ordered in-process event log.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ClubEvent>>,
}

impl RecordingEventSink {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ClubEvent> {
        self.events.lock().clone()
    }

    /// Recorded events on `topic`.
    #[must_use]
    pub fn events_on(&self, topic: EventTopic) -> Vec<ClubEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.topic() == topic)
            .cloned()
            .collect()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, event: ClubEvent) {
        self.events.lock().push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
