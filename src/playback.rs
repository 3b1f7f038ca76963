//! Cooperative playback clock.
//!
//! The clock is driven by the host's repaint loop rather than an owned timer
//! thread: the session calls [`PlaybackClock::advance`] once per tick (8 ms
//! is the recommended cadence) and applies the elapsed wall-clock time to the
//! cursor. There is no distinct Paused state: Stopped retains the cursor,
//! and only whether ticking is active distinguishes the two.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

#[derive(Debug, Default)]
pub struct PlaybackClock {
    state: PlaybackState,
    last_tick: Option<Instant>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Enter Playing, anchored at `now`. Returns false when already playing.
    pub fn start_at(&mut self, now: Instant) -> bool {
        if self.is_playing() {
            return false;
        }
        self.state = PlaybackState::Playing;
        self.last_tick = Some(now);
        true
    }

    /// Enter Stopped, retaining the cursor. Returns false when already
    /// stopped.
    pub fn stop(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.state = PlaybackState::Stopped;
        self.last_tick = None;
        true
    }

    /// Elapsed seconds since the previous tick while playing; `None` when
    /// stopped.
    pub fn advance(&mut self, now: Instant) -> Option<f64> {
        if !self.is_playing() {
            return None;
        }
        let last = self.last_tick.replace(now).unwrap_or(now);
        Some(now.saturating_duration_since(last).as_secs_f64())
    }

    /// Force Stopped regardless of current state.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Stopped;
        self.last_tick = None;
    }
}
