//! Shared configuration for the replay engine.
//!
//! Organised into sub-configs with sensible defaults; the whole tree
//! round-trips through JSON for persistence.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::dataset::Rgb;
use crate::data::window::WindowMode;

// ─────────────────────────────────────────────────────────────────────────────
// LoadPolicy
// ─────────────────────────────────────────────────────────────────────────────

/// What happens to existing session state when a dataset load fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadPolicy {
    /// Keep the previously loaded dataset and view intact on failure.
    #[default]
    PreserveOnFailure,
    /// Clear the session before attempting the load; a failure leaves an
    /// empty session.
    ClearFirst,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sub-configs
// ─────────────────────────────────────────────────────────────────────────────

/// Windowing behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Whether the window looks ahead of or trails behind the cursor.
    pub mode: WindowMode,
    /// Window length applied when a dataset is installed, in seconds.
    pub initial_length_secs: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            mode: WindowMode::Forward,
            initial_length_secs: 5.0,
        }
    }
}

/// Playback behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Recommended host tick interval (~120 Hz).
    pub tick_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { tick_interval_ms: 8 }
    }
}

/// Defaults applied to export jobs and the render surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    pub fps: u32,
    /// Surface size hint used when a renderer has not been measured yet.
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            fps: 30,
            width: 1280,
            height: 720,
            background: Rgb(16, 16, 20),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ReplayConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub window: WindowConfig,
    pub playback: PlaybackConfig,
    pub export: ExportDefaults,
    pub load_policy: LoadPolicy,
}

impl ReplayConfig {
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
