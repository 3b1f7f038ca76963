//! Immutable telemetry dataset: channels and time-ordered samples.
//!
//! A dataset is built once via [`DatasetBuilder`] and never mutated
//! afterwards; reloading a file produces an entirely new instance. Per-channel
//! value ranges are derived at build time from the whole session and stay
//! fixed: they describe the session, not the currently visible window.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// 24-bit display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

const PALETTE: [Rgb; 10] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
    Rgb(227, 119, 194),
    Rgb(127, 127, 127),
    Rgb(188, 189, 34),
    Rgb(23, 190, 207),
];

/// Allocate a distinct color for the given channel index.
pub fn alloc_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

/// Metadata for one telemetry channel. Identity is the name, unique within a
/// dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMeta {
    pub name: String,
    pub unit: String,
    /// Whole-session minimum, derived once at dataset construction.
    pub min_value: f64,
    /// Whole-session maximum, derived once at dataset construction.
    pub max_value: f64,
    pub color: Rgb,
    /// Initial visibility. Runtime visibility is owned by the session's
    /// visibility mask, not by the dataset.
    pub visible: bool,
}

/// One timestamped record. Sparse: a sample need not define every channel.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySample {
    /// Seconds from session start.
    pub timestamp: f64,
    pub values: HashMap<String, f64>,
}

impl TelemetrySample {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, channel: &str, value: f64) -> Self {
        self.values.insert(channel.to_string(), value);
        self
    }
}

/// Immutable collection of channels and time-sorted samples.
#[derive(Debug, Default)]
pub struct TelemetryDataset {
    channels: Vec<ChannelMeta>,
    samples: Vec<TelemetrySample>,
}

impl TelemetryDataset {
    /// Channels in presentation order.
    pub fn channels(&self) -> &[ChannelMeta] {
        &self.channels
    }

    /// Samples sorted ascending by timestamp.
    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelMeta> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the last sample, or 0 for an empty dataset.
    pub fn duration(&self) -> f64 {
        self.samples.last().map(|s| s.timestamp).unwrap_or(0.0)
    }

    /// Index range of samples with `start <= timestamp <= end`, found by
    /// binary search over the sorted timestamps.
    pub fn sample_range(&self, start: f64, end: f64) -> Range<usize> {
        if end < start {
            return 0..0;
        }
        let lo = self.samples.partition_point(|s| s.timestamp < start);
        let hi = self.samples.partition_point(|s| s.timestamp <= end);
        lo..hi.max(lo)
    }
}

struct ChannelSpec {
    name: String,
    unit: String,
    color: Option<Rgb>,
    visible: Option<bool>,
}

/// Builds a [`TelemetryDataset`]: sorts samples, derives per-channel value
/// ranges, assigns palette colors, and applies the default visibility rule
/// (first two channels visible unless set explicitly).
#[derive(Default)]
pub struct DatasetBuilder {
    channels: Vec<ChannelSpec>,
    samples: Vec<TelemetrySample>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(mut self, name: &str, unit: &str) -> Self {
        self.channels.push(ChannelSpec {
            name: name.to_string(),
            unit: unit.to_string(),
            color: None,
            visible: None,
        });
        self
    }

    /// Add a channel with an explicit color and/or visibility; `None` falls
    /// back to the palette / default-visibility rule.
    pub fn channel_with(
        mut self,
        name: &str,
        unit: &str,
        color: Option<Rgb>,
        visible: Option<bool>,
    ) -> Self {
        self.channels.push(ChannelSpec {
            name: name.to_string(),
            unit: unit.to_string(),
            color,
            visible,
        });
        self
    }

    pub fn sample(mut self, sample: TelemetrySample) -> Self {
        self.samples.push(sample);
        self
    }

    pub fn samples<I: IntoIterator<Item = TelemetrySample>>(mut self, iter: I) -> Self {
        self.samples.extend(iter);
        self
    }

    pub fn build(self) -> TelemetryDataset {
        let mut samples = self.samples;
        samples.sort_by(|a, b| {
            a.timestamp
                .partial_cmp(&b.timestamp)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let channels = self
            .channels
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                let mut min_value = f64::MAX;
                let mut max_value = f64::MIN;
                for sample in &samples {
                    if let Some(v) = sample.values.get(&spec.name) {
                        if *v < min_value {
                            min_value = *v;
                        }
                        if *v > max_value {
                            max_value = *v;
                        }
                    }
                }
                if min_value > max_value {
                    // channel defined by no sample
                    min_value = 0.0;
                    max_value = 0.0;
                }
                ChannelMeta {
                    color: spec.color.unwrap_or_else(|| alloc_color(index)),
                    visible: spec.visible.unwrap_or(index < 2),
                    name: spec.name,
                    unit: spec.unit,
                    min_value,
                    max_value,
                }
            })
            .collect();

        TelemetryDataset { channels, samples }
    }
}
