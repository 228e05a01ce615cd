pub mod status;

use crate::backend::{QueueBackend, SubmissionRequest, UploadReceipt};
use crate::draw::blank::is_blank;
use crate::draw::composite::export_png;
use crate::draw::model::Color;
use crate::draw::surface::DrawingSurface;
use crate::error::{SubmitError, ValidationError, SUBMIT_FAILED_MESSAGE};
use crate::queue::sync::RefreshHook;
use image::RgbaImage;
use status::{StatusLine, DEFAULT_STATUS_HOLD};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const SUCCESS_MESSAGE: &str = "Drawing submitted successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    /// Runs synchronously inside [`Submitter::submit`]; callers only see it
    /// in the debug transition log.
    Validating,
    Encoding,
    Uploading,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Validating | Self::Encoding | Self::Uploading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitConfig {
    /// Reject submissions whose author name is empty after trimming.
    pub require_name: bool,
    /// How long a status message stays visible.
    pub status_hold: Duration,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            require_name: true,
            status_hold: DEFAULT_STATUS_HOLD,
        }
    }
}

#[derive(Debug)]
enum WorkerEvent {
    Uploading,
    Finished(Result<UploadReceipt, SubmitError>),
}

/// Validates, encodes and uploads the drawing, then reports the outcome.
///
/// Encoding and the upload run on a worker thread; [`Submitter::poll`]
/// applies their result on the caller's thread, which is where the surface is
/// cleared and the queue refresh is triggered.
pub struct Submitter {
    backend: Arc<dyn QueueBackend>,
    refresh: Box<dyn RefreshHook>,
    config: SubmitConfig,
    phase: SubmissionPhase,
    status: StatusLine,
    worker: Option<Receiver<WorkerEvent>>,
}

impl Submitter {
    pub fn new(
        backend: Arc<dyn QueueBackend>,
        refresh: Box<dyn RefreshHook>,
        config: SubmitConfig,
    ) -> Self {
        Self {
            backend,
            refresh,
            config,
            phase: SubmissionPhase::Idle,
            status: StatusLine::new(config.status_hold),
            worker: None,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn config(&self) -> SubmitConfig {
        self.config
    }

    pub fn status(&self, now: Instant) -> Option<&str> {
        self.status.current(now)
    }

    /// Start a submission of the surface's current raster.
    ///
    /// Validation failures resolve immediately without touching the network.
    /// Calls made while a submission is in flight are ignored.
    pub fn submit(
        &mut self,
        surface: &DrawingSurface,
        author: &str,
        now: Instant,
    ) -> SubmissionPhase {
        if self.is_busy() {
            tracing::debug!(phase = ?self.phase, "submission already in flight; ignoring");
            return self.phase;
        }

        self.set_phase(SubmissionPhase::Validating);
        if let Err(err) = self.validate(surface, author) {
            self.fail(err, now);
            return self.phase;
        }

        let raster = surface.raster().clone();
        let background = surface.style().background;
        let author_name = (!author.trim().is_empty()).then(|| author.to_string());
        let backend = Arc::clone(&self.backend);
        let (tx, rx) = channel::<WorkerEvent>();

        std::thread::spawn(move || {
            run_submission(backend.as_ref(), &raster, background, author_name, &tx)
        });

        self.worker = Some(rx);
        self.set_phase(SubmissionPhase::Encoding);
        self.phase
    }

    /// Apply worker progress and expire the status message. Call once per
    /// frame.
    pub fn poll(&mut self, surface: &mut DrawingSurface, now: Instant) -> SubmissionPhase {
        self.expire_status(now);

        let Some(rx) = self.worker.take() else {
            return self.phase;
        };
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    if self.handle_event(event, surface, now) {
                        return self.phase;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.worker_lost(now);
                    return self.phase;
                }
            }
        }
        self.worker = Some(rx);
        self.phase
    }

    /// Block until the in-flight submission resolves or `timeout` passes.
    pub fn wait(&mut self, surface: &mut DrawingSurface, timeout: Duration) -> SubmissionPhase {
        let deadline = Instant::now() + timeout;
        while let Some(rx) = self.worker.take() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(event) => {
                    if !self.handle_event(event, surface, Instant::now()) {
                        self.worker = Some(rx);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.worker = Some(rx);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => self.worker_lost(Instant::now()),
            }
        }
        self.phase
    }

    fn set_phase(&mut self, phase: SubmissionPhase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, "submission phase");
            self.phase = phase;
        }
    }

    fn validate(&self, surface: &DrawingSurface, author: &str) -> Result<(), SubmitError> {
        if self.config.require_name && author.trim().is_empty() {
            return Err(ValidationError::NameRequired.into());
        }
        if is_blank(surface.raster(), surface.style().background)? {
            return Err(ValidationError::BlankCanvas.into());
        }
        Ok(())
    }

    /// Returns `true` once the submission has resolved.
    fn handle_event(
        &mut self,
        event: WorkerEvent,
        surface: &mut DrawingSurface,
        now: Instant,
    ) -> bool {
        match event {
            WorkerEvent::Uploading => {
                self.set_phase(SubmissionPhase::Uploading);
                false
            }
            WorkerEvent::Finished(Ok(receipt)) => {
                tracing::info!(
                    timestamp = receipt.timestamp.as_deref().unwrap_or("-"),
                    "drawing submitted"
                );
                surface.reset();
                self.refresh.refresh_now();
                self.set_phase(SubmissionPhase::Succeeded);
                self.status.set(SUCCESS_MESSAGE, now);
                true
            }
            WorkerEvent::Finished(Err(err)) => {
                self.fail(err, now);
                true
            }
        }
    }

    fn fail(&mut self, err: SubmitError, now: Instant) {
        if err.is_validation() {
            tracing::info!(error = %err, "submission rejected");
        } else {
            tracing::warn!(error = %err, "submission failed");
        }
        self.set_phase(SubmissionPhase::Failed);
        self.status.set(err.status_message(), now);
    }

    fn worker_lost(&mut self, now: Instant) {
        tracing::error!("submission worker exited without a result");
        self.set_phase(SubmissionPhase::Failed);
        self.status.set(SUBMIT_FAILED_MESSAGE, now);
    }

    fn expire_status(&mut self, now: Instant) {
        self.status.tick(now);
        if !self.is_busy() && self.status.is_empty() {
            self.set_phase(SubmissionPhase::Idle);
        }
    }
}

fn run_submission(
    backend: &dyn QueueBackend,
    raster: &RgbaImage,
    background: Color,
    author_name: Option<String>,
    events: &Sender<WorkerEvent>,
) {
    let image_png = match export_png(raster, background) {
        Ok(bytes) => bytes,
        Err(err) => {
            let _ = events.send(WorkerEvent::Finished(Err(err.into())));
            return;
        }
    };
    let _ = events.send(WorkerEvent::Uploading);
    let request = SubmissionRequest {
        author_name,
        image_png,
    };
    let result = backend.upload(&request).map_err(SubmitError::from);
    let _ = events.send(WorkerEvent::Finished(result));
}
