//! Window computation: mapping a cursor and window length onto per-channel
//! point runs.
//!
//! [`compute_window`] is a pure function of its inputs; it only reads the
//! dataset and is safe to invoke concurrently. Long computations check their
//! [`CancelToken`] at the selection and per-channel extraction boundaries and
//! abort with [`WindowError::Cancelled`] instead of producing a torn result.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::data::dataset::TelemetryDataset;
use crate::error::WindowError;

/// How the visible window relates to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowMode {
    /// The window shows data ahead of the cursor: `[cursor, cursor + length]`.
    #[default]
    Forward,
    /// The window trails behind the cursor: `[cursor - length, cursor]`.
    Trailing,
}

/// Ephemeral input to a window computation.
#[derive(Debug, Clone)]
pub struct WindowRequest {
    pub cursor: f64,
    /// Window span in seconds; `<= 0` means accumulate from the start of the
    /// data up to the cursor.
    pub window_length: f64,
    pub mode: WindowMode,
    /// Names of the channels to extract. Channels outside the mask get an
    /// empty run at O(1) cost.
    pub visibility: BTreeSet<String>,
}

impl WindowRequest {
    pub fn new(cursor: f64, window_length: f64) -> Self {
        Self {
            cursor,
            window_length,
            mode: WindowMode::default(),
            visibility: BTreeSet::new(),
        }
    }

    pub fn with_mode(mut self, mode: WindowMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_visibility<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visibility = names.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve the inclusive visible time range against a dataset duration.
    pub fn resolve_range(&self, duration: f64) -> (f64, f64) {
        if self.window_length > 0.0 {
            match self.mode {
                WindowMode::Forward => {
                    (self.cursor, (self.cursor + self.window_length).min(duration))
                }
                WindowMode::Trailing => {
                    ((self.cursor - self.window_length).max(0.0), self.cursor)
                }
            }
        } else {
            (0.0, self.cursor)
        }
    }
}

/// Per-channel point runs for one resolved window. Superseded results are
/// dropped whole, never merged.
#[derive(Debug, Clone, Default)]
pub struct WindowResult {
    /// `[timestamp, value]` pairs per channel name, in sample order.
    pub points: HashMap<String, Vec<[f64; 2]>>,
    /// The inclusive time range this window covers.
    pub range: (f64, f64),
}

impl WindowResult {
    pub fn channel_points(&self, name: &str) -> &[[f64; 2]] {
        self.points.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn latest_timestamp(&self, name: &str) -> Option<f64> {
        self.points.get(name)?.last().map(|p| p[0])
    }

    /// `true` when no channel has any point.
    pub fn is_empty(&self) -> bool {
        self.points.values().all(Vec::is_empty)
    }
}

// Samples per cancellation check inside one channel extraction.
const CANCEL_STRIDE: usize = 1024;

/// Compute the point runs for one window request.
pub fn compute_window(
    dataset: &TelemetryDataset,
    request: &WindowRequest,
    cancel: &CancelToken,
) -> Result<WindowResult, WindowError> {
    if !request.cursor.is_finite() || !request.window_length.is_finite() {
        return Err(WindowError::InvalidRequest(format!(
            "cursor={} window_length={}",
            request.cursor, request.window_length
        )));
    }

    let (start, end) = request.resolve_range(dataset.duration());
    let selected = dataset.sample_range(start, end);
    if cancel.is_cancelled() {
        return Err(WindowError::Cancelled);
    }
    let samples = &dataset.samples()[selected];

    // Mask entries naming unknown channels are a local fault: skipped, never
    // an error escaping the computation.
    for name in &request.visibility {
        if dataset.channel(name).is_none() {
            log::debug!("visibility mask references unknown channel {name:?}");
        }
    }

    let mut points: HashMap<String, Vec<[f64; 2]>> =
        HashMap::with_capacity(dataset.channels().len());
    for channel in dataset.channels() {
        if cancel.is_cancelled() {
            return Err(WindowError::Cancelled);
        }
        if !request.visibility.contains(&channel.name) {
            points.insert(channel.name.clone(), Vec::new());
            continue;
        }
        let mut run: Vec<[f64; 2]> = Vec::with_capacity(samples.len());
        for (i, sample) in samples.iter().enumerate() {
            if i % CANCEL_STRIDE == 0 && cancel.is_cancelled() {
                return Err(WindowError::Cancelled);
            }
            if let Some(value) = sample.values.get(&channel.name) {
                run.push([sample.timestamp, *value]);
            }
        }
        points.insert(channel.name.clone(), run);
    }

    Ok(WindowResult {
        points,
        range: (start, end),
    })
}
