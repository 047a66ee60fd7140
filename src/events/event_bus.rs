use super::types::{PlayerEvent, PlayerEventKind};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Event subscriber handle
pub struct EventSubscriber {
    receiver: broadcast::Receiver<PlayerEvent>,
    filter: Option<EventFilter>,
}

impl EventSubscriber {
    /// Create a new subscriber with an optional filter
    pub fn new(receiver: broadcast::Receiver<PlayerEvent>, filter: Option<EventFilter>) -> Self {
        Self { receiver, filter }
    }

    fn accepts(&self, event: &PlayerEvent) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(event))
    }

    /// Receive the next event matching the filter
    pub async fn recv(&mut self) -> Result<PlayerEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.accepts(&event) => return Ok(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Subscriber lagged, skipped {} events", skipped);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Try to receive without blocking
    pub fn try_recv(&mut self) -> Result<Option<PlayerEvent>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!("Subscriber lagged, skipped {} events", skipped);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Everything currently queued for this subscriber
    pub fn drain(&mut self) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Event filter for selective subscription
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    kinds: Option<Vec<PlayerEventKind>>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self { kinds: None }
    }

    pub fn with_kinds(mut self, kinds: Vec<PlayerEventKind>) -> Self {
        self.kinds = Some(kinds);
        self
    }

    pub fn matches(&self, event: &PlayerEvent) -> bool {
        if let Some(ref kinds) = self.kinds
            && !kinds.contains(&event.kind())
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Default, Clone)]
pub struct EventBusStats {
    pub total_events: u64,
    pub events_by_kind: HashMap<&'static str, u64>,
    pub subscriber_count: usize,
    pub dropped_events: u64,
}

#[derive(Debug, Default)]
struct Counters {
    total: AtomicU64,
    dropped: AtomicU64,
    by_kind: Mutex<HashMap<&'static str, u64>>,
}

/// Broadcasts player and continuity events to UI subscribers.
///
/// Publishing is synchronous and never fails; with no subscribers the event
/// is simply counted as dropped. Clones share the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
    counters: Arc<Counters>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Create a new event bus with specified buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn publish(&self, event: PlayerEvent) {
        let kind = event.kind();
        trace!("Publishing {} event", kind.as_str());

        self.counters.total.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut by_kind) = self.counters.by_kind.lock() {
            *by_kind.entry(kind.as_str()).or_insert(0) += 1;
        }

        if self.sender.send(event).is_err() {
            // No subscribers is normal
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Subscribe to all events
    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber::new(self.sender.subscribe(), None)
    }

    /// Subscribe with a filter
    pub fn subscribe_filtered(&self, filter: EventFilter) -> EventSubscriber {
        EventSubscriber::new(self.sender.subscribe(), Some(filter))
    }

    pub fn subscribe_to_kinds(&self, kinds: Vec<PlayerEventKind>) -> EventSubscriber {
        self.subscribe_filtered(EventFilter::new().with_kinds(kinds))
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn stats(&self) -> EventBusStats {
        EventBusStats {
            total_events: self.counters.total.load(Ordering::Relaxed),
            events_by_kind: self
                .counters
                .by_kind
                .lock()
                .map(|m| m.clone())
                .unwrap_or_default(),
            subscriber_count: self.subscriber_count(),
            dropped_events: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}
