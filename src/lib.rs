//! Telemetry timeline replay and export engine.
//!
//! Loads a multi-channel time-series dataset, maintains a scrolling or
//! accumulating window over it during playback, and can deterministically
//! re-render the timeline frame-by-frame into a video sink.
//!
//! The engine is organised into cohesive modules:
//! - `data`: dataset model, window computation, ingestion boundary
//! - `session`: the presentation-owned session facade
//! - `scheduler`: background windowing with last-request-wins cancellation
//! - `playback`: the cooperative playback clock
//! - `presentation`: the message-passing boundary to the owner thread
//! - `render`: pixel frames and the software chart rasterizer
//! - `export`: the frame-synchronized export pipeline and video sinks
//! - `events`: filtered event subscriptions
//! - `config`: shared configuration with JSON persistence

pub mod cancel;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod playback;
pub mod presentation;
pub mod render;
pub mod scheduler;
pub mod session;

// Public re-exports for a compact external API
pub use cancel::{CancelToken, GenerationCounter};
pub use config::{ExportDefaults, LoadPolicy, PlaybackConfig, ReplayConfig, WindowConfig};
pub use data::dataset::{
    alloc_color, ChannelMeta, DatasetBuilder, Rgb, TelemetryDataset, TelemetrySample,
};
pub use data::ingest::{CsvSource, DatasetSource};
pub use data::window::{compute_window, WindowMode, WindowRequest, WindowResult};
pub use error::{ExportError, ExportOutcome, LoadError, WindowError};
pub use events::{EventFilter, EventHub, EventKind, ReplayEvent};
pub use export::encoder::{PngSequenceSink, RawRgbaSink, VideoSink};
pub use export::pipeline::{ExportHandle, ExportSettings};
pub use playback::{PlaybackClock, PlaybackState};
pub use render::frame::{PixelFormat, PixelFrame};
pub use render::raster::{ChartRasterizer, FrameRenderer, RenderView};
pub use scheduler::WindowingScheduler;
pub use session::TimelineSession;
