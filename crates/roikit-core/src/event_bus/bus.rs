//! Event Bus implementation.
//!
//! Listeners registered with [`EventBus::subscribe`] run on the publishing
//! thread; async consumers take a broadcast [`EventBus::receiver`]. With
//! `record_replay` set, published events are also kept in a bounded replay
//! log that tests and late consumers can read back.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::fmt;
use std::sync::OnceLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0.simple())
    }
}

/// Which events a listener wants
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            Self::All => true,
            Self::Categories(wanted) => wanted.contains(&event.category()),
        }
    }
}

struct Listener {
    id: ListenerId,
    filter: EventFilter,
    callback: Box<dyn Fn(&AppEvent) + Send + Sync>,
}

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broadcast buffer per async receiver
    pub capacity: usize,
    pub record_replay: bool,
    /// Oldest replay entries are dropped past this many
    pub replay_limit: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            record_replay: false,
            replay_limit: 500,
        }
    }
}

#[derive(Debug, Clone)]
struct ReplayEntry {
    at: DateTime<Utc>,
    event: AppEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    #[error("Event {0} reached no listener")]
    NoListeners(EventCategory),
}

/// Publish/subscribe hub for region notifications
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    listeners: RwLock<Vec<Listener>>,
    replay: RwLock<VecDeque<ReplayEntry>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity.max(1));
        Self {
            sender,
            listeners: RwLock::new(Vec::new()),
            replay: RwLock::new(VecDeque::new()),
            config,
        }
    }

    /// Delivers `event` to matching listeners and to every async receiver.
    ///
    /// Returns the number of async receivers reached. An event that reaches
    /// neither a listener nor a receiver is reported as an error; it is
    /// still recorded for replay.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        let category = event.category();
        tracing::trace!(%category, "{}", event.description());

        if self.config.record_replay {
            let mut replay = self.replay.write();
            replay.push_back(ReplayEntry {
                at: Utc::now(),
                event: event.clone(),
            });
            let excess = replay.len().saturating_sub(self.config.replay_limit);
            replay.drain(..excess);
        }

        let listeners = self.listeners.read();
        let mut delivered = false;
        for listener in listeners.iter().filter(|l| l.filter.matches(&event)) {
            (listener.callback)(&event);
            delivered = true;
        }

        match self.sender.send(event) {
            Ok(receivers) => Ok(receivers),
            Err(_) if delivered => Ok(0),
            Err(_) => Err(EventBusError::NoListeners(category)),
        }
    }

    /// Registers a listener that runs synchronously inside [`publish`](Self::publish).
    pub fn subscribe<F>(&self, filter: EventFilter, callback: F) -> ListenerId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(Uuid::new_v4());
        self.listeners.write().push(Listener {
            id,
            filter,
            callback: Box::new(callback),
        });
        tracing::debug!(%id, "Listener added");
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        let removed = listeners.len() != before;
        if removed {
            tracing::debug!(%id, "Listener removed");
        }
        removed
    }

    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Replayed events published at or after `since`, oldest first.
    pub fn replayed(&self, since: Option<DateTime<Utc>>) -> Vec<AppEvent> {
        self.replay
            .read()
            .iter()
            .filter(|entry| since.is_none_or(|s| entry.at >= s))
            .map(|entry| entry.event.clone())
            .collect()
    }

    pub fn clear_replay(&self) {
        self.replay.write().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .field("receivers", &self.sender.receiver_count())
            .field("config", &self.config)
            .finish()
    }
}

static GLOBAL_BUS: OnceLock<EventBus> = OnceLock::new();

/// Process-wide bus, created with the default config on first use
pub fn event_bus() -> &'static EventBus {
    GLOBAL_BUS.get_or_init(EventBus::new)
}

/// Sets up the process-wide bus; hands `config` back if it already exists.
pub fn init_event_bus(config: EventBusConfig) -> Result<(), EventBusConfig> {
    if GLOBAL_BUS.get().is_some() {
        return Err(config);
    }
    GLOBAL_BUS
        .set(EventBus::with_config(config))
        .map_err(|bus| bus.config)
}

/// Publishes on the process-wide bus
#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::event_bus::event_bus().publish(::std::convert::Into::into($event))
    };
}
