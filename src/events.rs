//! Event hub for the replay engine.
//!
//! Observers subscribe with an [`EventFilter`] and receive matching
//! [`ReplayEvent`]s over an mpsc channel. Each event carries a set of
//! [`EventKind`] flags (bitflags-style); the filter is a simple OR mask: an
//! event is delivered when `(event.kinds & filter) != 0`. Dead receivers are
//! pruned on the next emit.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the categories an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    // ── Cursor / playback ───────────────────────────────────────────────
    /// The playback/export cursor moved.
    pub const CURSOR_MOVED: Self = Self(1 << 0);
    /// Playback entered the Playing state.
    pub const PLAYBACK_STARTED: Self = Self(1 << 1);
    /// Playback entered the Stopped state (pause, reset, or end of data).
    pub const PLAYBACK_STOPPED: Self = Self(1 << 2);

    // ── Windowing ───────────────────────────────────────────────────────
    /// A new window result was delivered to the presentation surface.
    pub const WINDOW_UPDATED: Self = Self(1 << 3);
    /// A channel was shown or hidden.
    pub const VISIBILITY_CHANGED: Self = Self(1 << 4);

    // ── Dataset ─────────────────────────────────────────────────────────
    /// A dataset finished loading.
    pub const DATASET_LOADED: Self = Self(1 << 5);
    /// A dataset load failed.
    pub const DATASET_LOAD_FAILED: Self = Self(1 << 6);

    // ── Export ──────────────────────────────────────────────────────────
    /// An export job started.
    pub const EXPORT_STARTED: Self = Self(1 << 7);
    /// Export progress advanced (percent payload).
    pub const EXPORT_PROGRESS: Self = Self(1 << 8);
    /// An export job terminated (completed, cancelled, or failed).
    pub const EXPORT_FINISHED: Self = Self(1 << 9);

    /// Wildcard: matches every event kind.
    pub const ALL: Self = Self(u64::MAX);

    /// Combine two event kinds (bitwise OR).
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// `true` if every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// `true` if any bit of `other` is set in `self`.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = EventKind;
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for EventKind {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ReplayEvent
// ─────────────────────────────────────────────────────────────────────────────

/// One occurrence delivered to subscribers. Payload fields are populated
/// depending on the kinds set.
#[derive(Debug, Clone)]
pub struct ReplayEvent {
    pub kinds: EventKind,
    /// Cursor position in seconds (cursor / window events).
    pub cursor: Option<f64>,
    /// Playback state (playback events).
    pub playing: Option<bool>,
    /// Channel name (visibility events).
    pub channel: Option<String>,
    /// Export progress 0..=100 (export progress events).
    pub percent: Option<u8>,
    /// Human-readable detail (load failures, export termination).
    pub message: Option<String>,
}

impl ReplayEvent {
    pub fn new(kinds: EventKind) -> Self {
        Self {
            kinds,
            cursor: None,
            playing: None,
            channel: None,
            percent: None,
            message: None,
        }
    }

    pub fn at_cursor(mut self, cursor: f64) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_playing(mut self, playing: bool) -> Self {
        self.playing = Some(playing);
        self
    }

    pub fn with_channel<S: Into<String>>(mut self, channel: S) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = Some(percent.min(100));
        self
    }

    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter / EventHub
// ─────────────────────────────────────────────────────────────────────────────

/// OR mask deciding which events a subscription receives.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter(pub EventKind);

impl EventFilter {
    /// Receive only events intersecting `kinds`.
    pub const fn only(kinds: EventKind) -> Self {
        Self(kinds)
    }

    /// Receive every event.
    pub const fn all() -> Self {
        Self(EventKind::ALL)
    }

    pub fn matches(&self, event: &ReplayEvent) -> bool {
        event.kinds.intersects(self.0)
    }
}

#[derive(Default)]
struct HubInner {
    listeners: Vec<(EventFilter, Sender<ReplayEvent>)>,
}

/// Shared hub carrying all engine notifications.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe with a filter; the receiver gets every matching event until
    /// it is dropped.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<ReplayEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap();
        inner.listeners.push((filter, tx));
        rx
    }

    pub fn subscribe_all(&self) -> Receiver<ReplayEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Deliver `event` to all matching subscribers, pruning dead receivers.
    pub fn emit(&self, event: ReplayEvent) {
        let mut inner = self.inner.lock().unwrap();
        inner.listeners.retain(|(filter, tx)| {
            if filter.matches(&event) {
                tx.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }
}
