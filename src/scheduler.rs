//! Interactive windowing scheduler.
//!
//! Serializes windowing requests on one worker thread with the guarantee
//! that the most recent request always wins: issuing a new request bumps the
//! generation counter, which cancels the in-flight computation at its next
//! checkpoint; queued-but-unstarted jobs are skipped entirely. Completed
//! results are posted to the presentation queue tagged with their
//! generation, and the session suppresses anything stale at delivery time,
//! so results are never delivered out of request order.

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::cancel::{CancelToken, GenerationCounter};
use crate::data::dataset::TelemetryDataset;
use crate::data::window::{compute_window, WindowRequest};
use crate::error::WindowError;
use crate::presentation::{PresentationHandle, SurfaceCommand};

struct Job {
    token: CancelToken,
    dataset: Arc<TelemetryDataset>,
    request: WindowRequest,
}

pub struct WindowingScheduler {
    generations: GenerationCounter,
    jobs: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl WindowingScheduler {
    /// Spawn the worker; completed results are posted through `delivery`.
    pub fn new(delivery: PresentationHandle) -> Self {
        let generations = GenerationCounter::new();
        let (tx, rx) = mpsc::channel::<Job>();

        let worker = std::thread::spawn(move || loop {
            let mut job = match rx.recv() {
                Ok(job) => job,
                Err(_) => break,
            };
            // Anything queued behind this job has already superseded it.
            while let Ok(newer) = rx.try_recv() {
                job = newer;
            }
            if job.token.is_cancelled() {
                continue;
            }
            match compute_window(&job.dataset, &job.request, &job.token) {
                Ok(result) => {
                    if job.token.is_cancelled() {
                        log::debug!(
                            "windowing generation {} superseded after completion",
                            job.token.generation()
                        );
                        continue;
                    }
                    let delivered = delivery.post(SurfaceCommand::DeliverWindow {
                        generation: job.token.generation(),
                        result,
                    });
                    if !delivered {
                        break;
                    }
                }
                Err(WindowError::Cancelled) => {
                    log::debug!(
                        "windowing generation {} cancelled mid-computation",
                        job.token.generation()
                    );
                }
                Err(err) => {
                    if !delivery.post(SurfaceCommand::WindowFault(err)) {
                        break;
                    }
                }
            }
        });

        Self {
            generations,
            jobs: Some(tx),
            worker: Some(worker),
        }
    }

    /// Non-blocking: supersedes any in-flight computation and queues this
    /// request. Safe to call once per animation tick or per checkbox click.
    pub fn request(&self, dataset: Arc<TelemetryDataset>, request: WindowRequest) {
        let token = self.generations.bump();
        if let Some(jobs) = &self.jobs {
            let _ = jobs.send(Job {
                token,
                dataset,
                request,
            });
        }
    }

    /// Generation of the most recent request. Results tagged with an older
    /// generation are stale and must not be delivered.
    pub fn current_generation(&self) -> u64 {
        self.generations.current()
    }
}

impl Drop for WindowingScheduler {
    fn drop(&mut self) {
        // Closing the job channel lets the worker exit on its next recv.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
