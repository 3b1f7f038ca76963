//! The presentation-context boundary.
//!
//! One single-owner execution context (the "presentation context") drives all
//! user-visible state and rendering. Worker contexts never assume thread
//! affinity; they post [`SurfaceCommand`]s into a single-consumer queue that
//! the owner drains via [`TimelineSession::pump`]. Request/response commands
//! carry a reply sender, so a worker can block on the answer while the owner
//! keeps pumping.
//!
//! [`TimelineSession::pump`]: crate::session::TimelineSession::pump

use std::sync::mpsc::{self, Receiver, Sender};

use crate::data::window::WindowResult;
use crate::error::{ExportError, WindowError};
use crate::render::frame::PixelFrame;

/// Commands posted by worker contexts, executed by the presentation owner.
pub enum SurfaceCommand {
    /// A completed background window computation, tagged with its generation
    /// so stale results can be suppressed at delivery time.
    DeliverWindow {
        generation: u64,
        result: WindowResult,
    },
    /// A computation fault surfaced by the windowing worker.
    WindowFault(WindowError),
    /// Synchronous frame render request from the export pipeline. The reply
    /// is the worker's promise: it blocks on the receiver until the owner
    /// has rendered the frame.
    RenderFrame {
        frame_index: u32,
        reply: Sender<Result<PixelFrame, ExportError>>,
    },
    /// The export pipeline terminated; `success` is true only for a
    /// completed (not cancelled, not failed) job.
    ExportFinished { success: bool },
}

/// Producer half: cloneable, held by worker contexts.
#[derive(Clone)]
pub struct PresentationHandle {
    tx: Sender<SurfaceCommand>,
}

/// Consumer half: owned by the presentation context.
pub struct PresentationQueue {
    rx: Receiver<SurfaceCommand>,
}

/// Create the command queue pair.
pub fn presentation_channel() -> (PresentationHandle, PresentationQueue) {
    let (tx, rx) = mpsc::channel();
    (PresentationHandle { tx }, PresentationQueue { rx })
}

impl PresentationHandle {
    /// Post a command; `false` when the presentation context is gone.
    pub fn post(&self, command: SurfaceCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    /// Block until the presentation context renders the given frame.
    ///
    /// Must not be called from the presentation thread itself: the render
    /// happens inside `pump()`, so a same-thread call would wait forever.
    pub fn render_frame(&self, frame_index: u32) -> Result<PixelFrame, ExportError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        if !self.post(SurfaceCommand::RenderFrame {
            frame_index,
            reply: reply_tx,
        }) {
            return Err(ExportError::Render(
                "presentation context is gone".to_string(),
            ));
        }
        match reply_rx.recv() {
            Ok(result) => result,
            Err(_) => Err(ExportError::Render(
                "presentation context dropped the render request".to_string(),
            )),
        }
    }
}

impl PresentationQueue {
    /// Next queued command, if any. Never blocks.
    pub fn try_recv(&self) -> Option<SurfaceCommand> {
        self.rx.try_recv().ok()
    }
}
