//! Frame-synchronized export pipeline.
//!
//! The pipeline runs on its own worker thread and drives frames strictly in
//! order `0..total_frames`. Each frame alternates two phases: the render is
//! marshalled onto the presentation context (which forces the cursor to the
//! frame's timestamp and recomputes the window synchronously, through the
//! same code path interactive playback uses), then the resulting pixel
//! buffer is canonicalised and handed to the sink on the pipeline thread.
//! At most one frame is ever in flight, so memory stays O(1) in the frame
//! count. Cancellation is checked at frame boundaries; the sink is finalised
//! on every exit path.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::{ExportError, ExportOutcome};
use crate::events::{EventHub, EventKind, ReplayEvent};
use crate::export::encoder::VideoSink;
use crate::presentation::{PresentationHandle, SurfaceCommand};

/// Parameters for one export job.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub fps: u32,
    /// Frames to render; defaults to `ceil(duration * fps)`, at least 1.
    pub total_frames: Option<u32>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            total_frames: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ExportShared {
    cancel: AtomicBool,
    frames_completed: AtomicU32,
    percent: AtomicU32,
    finished: AtomicBool,
    outcome: Mutex<Option<ExportOutcome>>,
}

impl ExportShared {
    fn new() -> Self {
        Self {
            cancel: AtomicBool::new(false),
            frames_completed: AtomicU32::new(0),
            percent: AtomicU32::new(0),
            finished: AtomicBool::new(false),
            outcome: Mutex::new(None),
        }
    }
}

/// Progress and cancellation handle for a running export job.
///
/// `wait` blocks until the pipeline thread exits; never call it from the
/// presentation thread while frames are pending, since the pipeline needs
/// that thread pumping to render.
#[derive(Debug)]
pub struct ExportHandle {
    shared: Arc<ExportShared>,
    thread: Option<JoinHandle<()>>,
}

impl ExportHandle {
    /// Request a clean stop. The current frame finishes; no further frame is
    /// started.
    pub fn cancel(&self) {
        self.shared.cancel.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.load(Ordering::Acquire)
    }

    pub fn frames_completed(&self) -> u32 {
        self.shared.frames_completed.load(Ordering::Acquire)
    }

    /// Progress 0..=100.
    pub fn percent(&self) -> u8 {
        self.shared.percent.load(Ordering::Acquire).min(100) as u8
    }

    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::Acquire)
    }

    /// Take the terminal outcome, if the job has finished.
    pub fn take_outcome(&self) -> Option<ExportOutcome> {
        self.shared.outcome.lock().unwrap().take()
    }

    /// Block until the pipeline thread exits and return the outcome.
    pub fn wait(mut self) -> ExportOutcome {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        self.take_outcome().unwrap_or(ExportOutcome::Failed(ExportError::Render(
            "export pipeline terminated without an outcome".to_string(),
        )))
    }
}

pub(crate) fn spawn(
    duration: f64,
    settings: ExportSettings,
    presentation: PresentationHandle,
    sink: Box<dyn VideoSink>,
    events: EventHub,
) -> ExportHandle {
    let shared = Arc::new(ExportShared::new());
    let worker_shared = Arc::clone(&shared);

    let thread = std::thread::spawn(move || {
        let outcome = run(duration, settings, &presentation, sink, &worker_shared, &events);
        let success = outcome.is_success();
        let message = match &outcome {
            ExportOutcome::Completed => "completed".to_string(),
            ExportOutcome::Cancelled => "cancelled".to_string(),
            ExportOutcome::Failed(err) => err.to_string(),
        };
        *worker_shared.outcome.lock().unwrap() = Some(outcome);
        events.emit(ReplayEvent::new(EventKind::EXPORT_FINISHED).with_message(message));
        let _ = presentation.post(SurfaceCommand::ExportFinished { success });
        // Flag last: anyone observing `finished` will find the outcome and
        // the queued termination command already in place.
        worker_shared.finished.store(true, Ordering::Release);
    });

    ExportHandle {
        shared,
        thread: Some(thread),
    }
}

fn run(
    duration: f64,
    settings: ExportSettings,
    presentation: &PresentationHandle,
    mut sink: Box<dyn VideoSink>,
    shared: &ExportShared,
    events: &EventHub,
) -> ExportOutcome {
    let fps = settings.fps.max(1);
    let total = settings
        .total_frames
        .unwrap_or_else(|| (duration * fps as f64).ceil() as u32)
        .max(1);

    let mut failure: Option<ExportError> = None;
    let mut cancelled = false;
    let mut opened = false;

    for frame_index in 0..total {
        if shared.cancel.load(Ordering::Acquire) {
            cancelled = true;
            break;
        }
        let frame = match presentation.render_frame(frame_index) {
            Ok(frame) => frame,
            Err(err) => {
                failure = Some(err);
                break;
            }
        };
        if !opened {
            // Dimensions are fixed for the whole job from the first capture.
            if let Err(err) = sink.open(frame.width, frame.height, fps) {
                failure = Some(err);
                break;
            }
            opened = true;
        }
        let frame = frame.into_rgba8();
        if let Err(err) = sink.append_frame(&frame) {
            failure = Some(err);
            break;
        }
        let completed = frame_index + 1;
        shared.frames_completed.store(completed, Ordering::Release);
        let percent =
            ((completed as f64 * 100.0 / total as f64).round() as i64).clamp(0, 100) as u32;
        shared.percent.store(percent, Ordering::Release);
        events.emit(ReplayEvent::new(EventKind::EXPORT_PROGRESS).with_percent(percent as u8));
    }

    // The sink is finalised on every exit path.
    if let Err(err) = sink.close() {
        if failure.is_none() && !cancelled {
            failure = Some(err);
        } else {
            log::warn!("sink close failed after abort: {err}");
        }
    }

    if let Some(err) = failure {
        log::error!("export failed: {err}");
        ExportOutcome::Failed(err)
    } else if cancelled {
        log::debug!(
            "export cancelled after {} frames",
            shared.frames_completed.load(Ordering::Acquire)
        );
        ExportOutcome::Cancelled
    } else {
        ExportOutcome::Completed
    }
}
