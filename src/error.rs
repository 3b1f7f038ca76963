//! Error taxonomy for the replay engine.
//!
//! Cancellation is modelled as a distinct [`WindowError`] variant rather than
//! a failure: a superseded windowing request and a user-cancelled export are
//! expected control flow and are never surfaced as errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Faults raised by a window computation.
#[derive(Debug, Error)]
pub enum WindowError {
    /// The computation was superseded by a newer request. Expected flow,
    /// silently dropped by the scheduler.
    #[error("window computation cancelled")]
    Cancelled,
    /// The request itself is unusable (non-finite cursor or window length).
    #[error("invalid window request: {0}")]
    InvalidRequest(String),
}

impl WindowError {
    /// `true` for the expected-cancellation variant.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WindowError::Cancelled)
    }
}

/// Faults raised while loading a dataset through a [`DatasetSource`].
///
/// [`DatasetSource`]: crate::data::ingest::DatasetSource
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid telemetry table: {0}")]
    FormatInvalid(String),
}

/// Terminal faults of an export job. Exactly one of these is surfaced per
/// failed job; per-frame errors are never reported individually.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no dataset loaded")]
    NoDataset,
    #[error("no frame renderer bound")]
    NoRenderer,
    #[error("invalid export settings: {0}")]
    InvalidSettings(String),
    #[error("frame render failed: {0}")]
    Render(String),
    #[error("encoder rejected frame: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// How an export job ended. `Cancelled` is a clean stop, not a failure.
#[derive(Debug)]
pub enum ExportOutcome {
    Completed,
    Cancelled,
    Failed(ExportError),
}

impl ExportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExportOutcome::Completed)
    }
}
