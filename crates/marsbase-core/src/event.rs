//! Typed settlement events, buffered per kind.
//!
//! Kitchens, dessert stations and loading controllers emit events while a
//! settlement is ticked. Each event kind has its own [`EventBuffer`] so a
//! chatty kind never evicts a rare one. Buffered events stay readable after
//! delivery through [`EventLog::events_since`], which is a pure read.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventLog::suppress`]. Suppressed
//! kinds are never buffered or delivered.

use crate::clock::MarsTime;
use crate::cooking::dish::SpoilageOutcome;
use crate::id::{DessertStationId, KitchenId, VehicleId};
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Facility that produced a kitchen event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facility {
    Kitchen(KitchenId),
    DessertStation(DessertStationId),
}

/// A settlement event. All events carry the time at which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // -- Cooking --
    MealCooked {
        kitchen: KitchenId,
        dish: String,
        quality: f64,
        time: MarsTime,
    },
    MealExpired {
        kitchen: KitchenId,
        dish: String,
        outcome: SpoilageOutcome,
        mass: f64,
        time: MarsTime,
    },
    DessertPrepared {
        station: DessertStationId,
        dessert: String,
        quality: f64,
        time: MarsTime,
    },
    DessertExpired {
        station: DessertStationId,
        dessert: String,
        outcome: SpoilageOutcome,
        mass: f64,
        time: MarsTime,
    },

    // -- Kitchen upkeep --
    KitchenCleaned {
        facility: Facility,
        cleanliness: f64,
        time: MarsTime,
    },
    CookingSuppressed {
        facility: Facility,
        available: u32,
        cap: f64,
        time: MarsTime,
    },

    // -- Vehicle loading --
    LoadingCompleted {
        vehicle: VehicleId,
        time: MarsTime,
    },
    LoadingFailed {
        vehicle: VehicleId,
        attempts: u32,
        time: MarsTime,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MealCooked,
    MealExpired,
    DessertPrepared,
    DessertExpired,
    KitchenCleaned,
    CookingSuppressed,
    LoadingCompleted,
    LoadingFailed,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 8;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::MealCooked { .. } => EventKind::MealCooked,
            Event::MealExpired { .. } => EventKind::MealExpired,
            Event::DessertPrepared { .. } => EventKind::DessertPrepared,
            Event::DessertExpired { .. } => EventKind::DessertExpired,
            Event::KitchenCleaned { .. } => EventKind::KitchenCleaned,
            Event::CookingSuppressed { .. } => EventKind::CookingSuppressed,
            Event::LoadingCompleted { .. } => EventKind::LoadingCompleted,
            Event::LoadingFailed { .. } => EventKind::LoadingFailed,
        }
    }

    pub fn time(&self) -> MarsTime {
        match self {
            Event::MealCooked { time, .. }
            | Event::MealExpired { time, .. }
            | Event::DessertPrepared { time, .. }
            | Event::DessertExpired { time, .. }
            | Event::KitchenCleaned { time, .. }
            | Event::CookingSuppressed { time, .. }
            | Event::LoadingCompleted { time, .. }
            | Event::LoadingFailed { time, .. } => *time,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer
// ---------------------------------------------------------------------------

/// Bounded event history. Once `capacity` events are held, each push
/// evicts the oldest.
#[derive(Debug)]
pub struct EventBuffer {
    events: VecDeque<Event>,
    capacity: usize,
    total_written: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every event ever pushed, evicted or not.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    pub fn dropped_count(&self) -> u64 {
        self.total_written - self.events.len() as u64
    }

    /// Oldest first.
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Event> {
        self.events.iter()
    }

    /// Forget the held events. `total_written` keeps counting.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

/// Holds one ring buffer per event kind, passive listeners, and
/// suppression flags.
pub struct EventLog {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: [Vec<PassiveListener>; EVENT_KIND_COUNT],
    /// `total_written` of each buffer at the last delivery.
    delivered: [u64; EVENT_KIND_COUNT],
    default_capacity: usize,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventLog {
    /// Create a log with the given buffer capacity per event kind.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Default::default(),
            delivered: [0; EVENT_KIND_COUNT],
            default_capacity,
        }
    }

    /// Suppress an event kind and drop anything already buffered for it.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
        self.delivered[kind.index()] = 0;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Record an event. No-ops if the kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.default_capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    /// Register a passive listener for an event kind.
    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.listeners[kind.index()].push(listener);
    }

    /// Hand every event emitted since the previous delivery to the
    /// listeners of its kind, oldest first. Events stay buffered.
    pub fn deliver(&mut self) {
        for idx in 0..EVENT_KIND_COUNT {
            let Some(buffer) = self.buffers[idx].as_ref() else {
                continue;
            };
            let fresh = buffer.total_written() - self.delivered[idx];
            self.delivered[idx] = buffer.total_written();
            if fresh == 0 || self.listeners[idx].is_empty() {
                continue;
            }
            let skip = buffer.len().saturating_sub(fresh as usize);
            for event in buffer.iter().skip(skip) {
                for listener in &mut self.listeners[idx] {
                    listener(event);
                }
            }
        }
    }

    /// Buffered events of one kind, oldest first.
    pub fn events(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.buffers[kind.index()]
            .as_ref()
            .into_iter()
            .flat_map(EventBuffer::iter)
    }

    /// Every buffered event at or after `since`, ordered by time. Does not
    /// consume anything.
    pub fn events_since(&self, since: MarsTime) -> Vec<&Event> {
        let mut out: Vec<&Event> = self
            .buffers
            .iter()
            .flatten()
            .flat_map(EventBuffer::iter)
            .filter(|e| e.time() >= since)
            .collect();
        out.sort_by(|a, b| a.time().total_millisols().total_cmp(&b.time().total_millisols()));
        out
    }

    /// Number of buffered events of one kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.buffers[kind.index()]
            .as_ref()
            .map(EventBuffer::len)
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        for (buffer, delivered) in self.buffers.iter_mut().zip(&mut self.delivered) {
            if let Some(b) = buffer {
                b.clear();
                *delivered = b.total_written();
            }
        }
    }
}
