//! The timeline session: the explicitly-owned object tying the engine
//! together.
//!
//! A [`TimelineSession`] is owned by the presentation context. It holds the
//! current dataset (immutable, `Arc`-shared with workers), the cursor, the
//! window length and mode, the visibility mask, the playback clock, the
//! windowing scheduler, and the latest delivered window result. Every
//! mutation happens on the owning thread; worker contexts communicate
//! exclusively through the presentation queue, drained by [`pump`].
//!
//! Host integration is two calls per frame: [`tick`] advances playback,
//! [`pump`] processes deliveries and export render requests.
//!
//! [`pump`]: TimelineSession::pump
//! [`tick`]: TimelineSession::tick

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::cancel::CancelToken;
use crate::config::{LoadPolicy, ReplayConfig};
use crate::data::dataset::TelemetryDataset;
use crate::data::ingest::DatasetSource;
use crate::data::window::{compute_window, WindowMode, WindowRequest, WindowResult};
use crate::error::{ExportError, LoadError, WindowError};
use crate::events::{EventHub, EventKind, ReplayEvent};
use crate::export::encoder::VideoSink;
use crate::export::pipeline::{self, ExportHandle, ExportSettings};
use crate::playback::PlaybackClock;
use crate::presentation::{presentation_channel, PresentationHandle, PresentationQueue, SurfaceCommand};
use crate::render::frame::PixelFrame;
use crate::render::raster::{FrameRenderer, RenderView};
use crate::scheduler::WindowingScheduler;

struct ActiveExport {
    fps: u32,
    resume_playback: bool,
}

pub struct TimelineSession {
    config: ReplayConfig,
    dataset: Option<Arc<TelemetryDataset>>,
    cursor: f64,
    window_length: f64,
    visibility: BTreeSet<String>,
    latest_window: Option<WindowResult>,
    last_delivered: u64,
    clock: PlaybackClock,
    scheduler: WindowingScheduler,
    events: EventHub,
    queue: PresentationQueue,
    handle: PresentationHandle,
    renderer: Option<Box<dyn FrameRenderer>>,
    on_window_result: Option<Box<dyn FnMut(&WindowResult) + Send>>,
    on_window_fault: Option<Box<dyn FnMut(&WindowError) + Send>>,
    active_export: Option<ActiveExport>,
}

impl Default for TimelineSession {
    fn default() -> Self {
        Self::new(ReplayConfig::default())
    }
}

impl TimelineSession {
    pub fn new(config: ReplayConfig) -> Self {
        let (handle, queue) = presentation_channel();
        let scheduler = WindowingScheduler::new(handle.clone());
        let window_length = config.window.initial_length_secs.max(0.0);
        Self {
            config,
            dataset: None,
            cursor: 0.0,
            window_length,
            visibility: BTreeSet::new(),
            latest_window: None,
            last_delivered: 0,
            clock: PlaybackClock::new(),
            scheduler,
            events: EventHub::new(),
            queue,
            handle,
            renderer: None,
            on_window_result: None,
            on_window_fault: None,
            active_export: None,
        }
    }

    // ── Wiring ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// The hub carrying all engine notifications; subscribe with a filter.
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Bind the render surface used for export captures.
    pub fn set_renderer(&mut self, renderer: Box<dyn FrameRenderer>) {
        self.renderer = Some(renderer);
    }

    /// Register the single designated window-result callback. It runs on
    /// the presentation thread, inside [`pump`](Self::pump).
    pub fn on_window_result<F>(&mut self, callback: F)
    where
        F: FnMut(&WindowResult) + Send + 'static,
    {
        self.on_window_result = Some(Box::new(callback));
    }

    /// Register a callback for windowing faults (cancellations are not
    /// faults and never reach it).
    pub fn on_window_fault<F>(&mut self, callback: F)
    where
        F: FnMut(&WindowError) + Send + 'static,
    {
        self.on_window_fault = Some(Box::new(callback));
    }

    // ── Dataset ──────────────────────────────────────────────────────────

    pub fn dataset(&self) -> Option<&Arc<TelemetryDataset>> {
        self.dataset.as_ref()
    }

    pub fn duration(&self) -> f64 {
        self.dataset.as_ref().map(|d| d.duration()).unwrap_or(0.0)
    }

    /// Load a dataset through a source, applying the configured
    /// [`LoadPolicy`] on failure.
    pub fn load_dataset(
        &mut self,
        source: &dyn DatasetSource,
        path: &Path,
    ) -> Result<(), LoadError> {
        if self.config.load_policy == LoadPolicy::ClearFirst {
            self.clear();
        }
        match source.load(path) {
            Ok(dataset) => {
                self.install_dataset(dataset);
                Ok(())
            }
            Err(err) => {
                log::warn!("dataset load failed: {err}");
                self.events.emit(
                    ReplayEvent::new(EventKind::DATASET_LOAD_FAILED).with_message(err.to_string()),
                );
                Err(err)
            }
        }
    }

    /// Install an already-built dataset (the ingestion collaborator's
    /// output).
    pub fn set_dataset(&mut self, dataset: TelemetryDataset) {
        self.install_dataset(dataset);
    }

    fn install_dataset(&mut self, dataset: TelemetryDataset) {
        self.pause();
        let dataset = Arc::new(dataset);
        self.visibility = dataset
            .channels()
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.name.clone())
            .collect();
        self.cursor = 0.0;
        self.window_length =
            clamp_window_length(self.config.window.initial_length_secs, dataset.duration());
        self.latest_window = None;
        self.events.emit(
            ReplayEvent::new(EventKind::DATASET_LOADED).with_message(format!(
                "{} channels, {} samples",
                dataset.channels().len(),
                dataset.samples().len()
            )),
        );
        self.dataset = Some(dataset);
        self.request_rewindow();
    }

    /// Drop the dataset and all derived view state.
    pub fn clear(&mut self) {
        self.pause();
        self.clock.reset();
        self.dataset = None;
        self.latest_window = None;
        self.visibility.clear();
        self.cursor = 0.0;
    }

    // ── View state ───────────────────────────────────────────────────────

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn window_length(&self) -> f64 {
        self.window_length
    }

    pub fn window_mode(&self) -> WindowMode {
        self.config.window.mode
    }

    pub fn visible_channels(&self) -> &BTreeSet<String> {
        &self.visibility
    }

    /// The latest delivered window result. Owned by the presentation
    /// context; workers never touch it after handoff.
    pub fn window_snapshot(&self) -> Option<&WindowResult> {
        self.latest_window.as_ref()
    }

    pub fn set_cursor(&mut self, time: f64) {
        let clamped = time.clamp(0.0, self.duration());
        if clamped == self.cursor {
            return;
        }
        self.force_cursor(clamped);
        self.request_rewindow();
    }

    pub fn set_window_length(&mut self, secs: f64) {
        let clamped = clamp_window_length(secs, self.duration());
        if clamped == self.window_length {
            return;
        }
        self.window_length = clamped;
        self.request_rewindow();
    }

    pub fn set_window_mode(&mut self, mode: WindowMode) {
        if self.config.window.mode == mode {
            return;
        }
        self.config.window.mode = mode;
        self.request_rewindow();
    }

    /// Show or hide a channel. Unknown names are ignored. The change funnels
    /// through the same windowing entry point as cursor moves.
    pub fn set_channel_visible(&mut self, name: &str, visible: bool) {
        let known = self
            .dataset
            .as_ref()
            .map_or(false, |d| d.channel(name).is_some());
        if !known {
            log::warn!("ignoring visibility change for unknown channel {name:?}");
            return;
        }
        let changed = if visible {
            self.visibility.insert(name.to_string())
        } else {
            self.visibility.remove(name)
        };
        if !changed {
            return;
        }
        self.events.emit(
            ReplayEvent::new(EventKind::VISIBILITY_CHANGED)
                .with_channel(name)
                .with_playing(visible),
        );
        self.request_rewindow();
    }

    /// Queue a background recomputation of the current window. Non-blocking;
    /// any in-flight computation is superseded.
    pub fn request_rewindow(&mut self) {
        if let Some(dataset) = &self.dataset {
            self.scheduler
                .request(Arc::clone(dataset), self.window_request());
        }
    }

    fn window_request(&self) -> WindowRequest {
        WindowRequest {
            cursor: self.cursor,
            window_length: self.window_length,
            mode: self.config.window.mode,
            visibility: self.visibility.clone(),
        }
    }

    fn force_cursor(&mut self, time: f64) {
        self.cursor = time;
        self.events
            .emit(ReplayEvent::new(EventKind::CURSOR_MOVED).at_cursor(time));
    }

    // ── Playback ─────────────────────────────────────────────────────────

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Start playback. A no-op (returning false) with no dataset, with an
    /// empty dataset, or while already playing.
    pub fn play(&mut self) -> bool {
        if self.duration() <= 0.0 || self.clock.is_playing() {
            return false;
        }
        self.clock.start_at(Instant::now());
        self.events
            .emit(ReplayEvent::new(EventKind::PLAYBACK_STARTED).with_playing(true));
        true
    }

    /// Stop ticking, retaining the cursor. Returns false when already
    /// stopped.
    pub fn pause(&mut self) -> bool {
        if !self.clock.stop() {
            return false;
        }
        self.events
            .emit(ReplayEvent::new(EventKind::PLAYBACK_STOPPED).with_playing(false));
        true
    }

    pub fn toggle_playback(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Force Stopped and cursor 0 regardless of current state.
    pub fn reset(&mut self) {
        self.pause();
        self.clock.reset();
        self.set_cursor(0.0);
    }

    /// Advance playback by the wall-clock time since the previous tick.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        let Some(elapsed) = self.clock.advance(now) else {
            return;
        };
        let duration = self.duration();
        let next = self.cursor + elapsed;
        if next >= duration {
            // Clamp exactly at the end, never overshoot, and auto-stop.
            self.set_cursor(duration);
            self.pause();
        } else {
            self.set_cursor(next);
        }
    }

    // ── Presentation pump ────────────────────────────────────────────────

    /// Drain the presentation queue: deliver completed window results (in
    /// request order, stale ones suppressed), answer export render
    /// requests, and finish export bookkeeping. Call once per host frame.
    pub fn pump(&mut self) {
        while let Some(command) = self.queue.try_recv() {
            match command {
                SurfaceCommand::DeliverWindow { generation, result } => {
                    self.deliver_window(generation, result);
                }
                SurfaceCommand::WindowFault(err) => {
                    if let Some(callback) = self.on_window_fault.as_mut() {
                        callback(&err);
                    } else {
                        log::warn!("windowing fault: {err}");
                    }
                }
                SurfaceCommand::RenderFrame { frame_index, reply } => {
                    let response = self.render_export_frame(frame_index);
                    let _ = reply.send(response);
                }
                SurfaceCommand::ExportFinished { success } => {
                    if let Some(job) = self.active_export.take() {
                        if success && job.resume_playback {
                            self.play();
                        }
                    }
                }
            }
        }
    }

    fn deliver_window(&mut self, generation: u64, result: WindowResult) {
        if generation != self.scheduler.current_generation() || generation <= self.last_delivered {
            log::debug!("suppressing stale window result (generation {generation})");
            return;
        }
        self.last_delivered = generation;
        if let Some(callback) = self.on_window_result.as_mut() {
            callback(&result);
        }
        self.events
            .emit(ReplayEvent::new(EventKind::WINDOW_UPDATED).at_cursor(self.cursor));
        self.latest_window = Some(result);
    }

    // ── Export ───────────────────────────────────────────────────────────

    pub fn export_active(&self) -> bool {
        self.active_export.is_some()
    }

    /// Start an export job on a worker thread. Playback is paused for the
    /// duration of the job and resumed afterwards only if the job completes
    /// successfully. The caller must keep pumping this session for the job
    /// to make progress.
    pub fn start_export(
        &mut self,
        settings: ExportSettings,
        sink: Box<dyn VideoSink>,
    ) -> Result<ExportHandle, ExportError> {
        if self.active_export.is_some() {
            return Err(ExportError::InvalidSettings(
                "an export job is already running".to_string(),
            ));
        }
        let dataset = self.dataset.clone().ok_or(ExportError::NoDataset)?;
        if self.renderer.is_none() {
            return Err(ExportError::NoRenderer);
        }
        if settings.fps == 0 {
            return Err(ExportError::InvalidSettings(
                "fps must be at least 1".to_string(),
            ));
        }
        if settings.total_frames == Some(0) {
            return Err(ExportError::InvalidSettings(
                "total_frames must be at least 1".to_string(),
            ));
        }

        let resume_playback = self.is_playing();
        self.pause();
        self.active_export = Some(ActiveExport {
            fps: settings.fps,
            resume_playback,
        });
        self.events.emit(ReplayEvent::new(EventKind::EXPORT_STARTED));

        Ok(pipeline::spawn(
            dataset.duration(),
            settings,
            self.handle.clone(),
            sink,
            self.events.clone(),
        ))
    }

    /// Render one export frame: force the cursor to the frame's timestamp,
    /// recompute the window synchronously through the interactive code path,
    /// and rasterize. Runs on the presentation thread inside `pump()`.
    fn render_export_frame(&mut self, frame_index: u32) -> Result<PixelFrame, ExportError> {
        let dataset = self.dataset.clone().ok_or(ExportError::NoDataset)?;
        let fps = self
            .active_export
            .as_ref()
            .map(|job| job.fps)
            .unwrap_or(self.config.export.fps)
            .max(1);
        let target = (frame_index as f64 / fps as f64).min(dataset.duration());
        self.force_cursor(target);

        let request = self.window_request();
        let result = compute_window(&dataset, &request, &CancelToken::never())
            .map_err(|err| ExportError::Render(err.to_string()))?;

        let hint = (self.config.export.width, self.config.export.height);
        let renderer = self.renderer.as_mut().ok_or(ExportError::NoRenderer)?;
        if renderer.size().0 == 0 || renderer.size().1 == 0 {
            renderer.measure(hint);
        }
        let view = RenderView {
            channels: dataset.channels(),
            window: &result,
            cursor: target,
            duration: dataset.duration(),
        };
        let frame = renderer.render(&view)?;
        // The interactive surface shows exactly what the frame shows.
        self.latest_window = Some(result);
        Ok(frame)
    }
}

fn clamp_window_length(secs: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        secs.clamp(0.0, duration)
    } else {
        secs.max(0.0)
    }
}
