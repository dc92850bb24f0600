use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::analysis::domain::analysis_client::AnalysisClient;
use crate::analysis::domain::analysis_error::AnalysisError;
use crate::analysis::domain::analysis_result::AnalysisOutcome;
use crate::analysis::domain::analysis_task::AnalysisTask;
use crate::capture::capture_source::{CaptureError, CaptureSource};
use crate::pipeline::infrastructure::analysis_worker::{self, WorkerMessage};
use crate::pipeline::notifier::Notifier;
use crate::rendering::domain::result_renderer::{ResultRenderer, DISPLAY_ERROR_MESSAGE};
use crate::rendering::infrastructure::raster_surface::RasterSurface;
use crate::session::result_summary::ResultSummary;
use crate::session::revert_scheduler::Clock;
use crate::session::session_state::{PreconditionError, RequestTicket};
use crate::session::trigger_control::{Trigger, TriggerControl};
use crate::session::ui_state_controller::{Settlement, UiStateController};
use crate::shared::captured_image::CapturedImage;

/// Outcome of one applied worker completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Rendered(AnalysisTask),
    Failed { task: AnalysisTask, message: String },
    /// The image changed while the request was pending; nothing was shown.
    Discarded(AnalysisTask),
}

/// Capture, analyse, display.
///
/// Owns every piece of session state and is driven from a single thread.
/// Analyses run on worker threads and come back through one channel, which
/// is drained by [`pump`](Self::pump).
pub struct AnnotationSession {
    source: CaptureSource,
    client: Arc<dyn AnalysisClient>,
    renderer: ResultRenderer,
    controller: UiStateController,
    surface: RasterSurface,
    notifier: Box<dyn Notifier>,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
}

impl AnnotationSession {
    pub fn new(
        source: CaptureSource,
        client: Arc<dyn AnalysisClient>,
        notifier: Box<dyn Notifier>,
        clock: Box<dyn Clock>,
        confirmation: Duration,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            source,
            client,
            renderer: ResultRenderer::default(),
            controller: UiStateController::new(clock, confirmation),
            surface: RasterSurface::new(),
            notifier,
            tx,
            rx,
        }
    }

    pub fn with_surface(mut self, surface: RasterSurface) -> Self {
        self.surface = surface;
        self
    }

    pub fn current_image(&self) -> Option<&CapturedImage> {
        self.controller.current_image()
    }

    pub fn summary(&self) -> &ResultSummary {
        self.controller.summary()
    }

    pub fn control(&self, trigger: Trigger) -> &TriggerControl {
        self.controller.control(trigger)
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn any_in_flight(&self) -> bool {
        self.controller.any_in_flight()
    }

    pub fn capture(&mut self) -> Result<CapturedImage, CaptureError> {
        match self.source.capture() {
            Ok(image) => {
                self.controller.on_capture(image.clone());
                self.surface.clear();
                Ok(image)
            }
            Err(e) => {
                self.notifier.alert(&e.to_string());
                Err(e)
            }
        }
    }

    pub fn request(&mut self, task: AnalysisTask) -> Result<RequestTicket, PreconditionError> {
        let ticket = match self.controller.begin(task) {
            Ok(ticket) => ticket,
            Err(e) => {
                self.notifier.alert(&e.to_string());
                return Err(e);
            }
        };
        let image = self
            .controller
            .current_image()
            .cloned()
            .ok_or(PreconditionError::NoImage)?;

        log::info!("Requesting {task} for generation {}", ticket.generation);
        analysis_worker::spawn(self.client.clone(), image, ticket, self.tx.clone());
        Ok(ticket)
    }

    /// Fires due reverts, then waits up to `timeout` for one completion.
    pub fn pump(&mut self, timeout: Duration) -> Option<SessionEvent> {
        self.controller.tick();
        match self.rx.recv_timeout(timeout) {
            Ok(message) => {
                let event = self.apply(message);
                self.controller.tick();
                event
            }
            Err(RecvTimeoutError::Timeout) => None,
            // Unreachable while `self.tx` is alive.
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Pumps until no request is pending or `timeout` runs out.
    pub fn run_until_settled(&mut self, timeout: Duration) -> Vec<SessionEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        while self.any_in_flight() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::warn!("Gave up waiting for pending analyses after {timeout:?}");
                break;
            }
            let wait = self
                .controller
                .next_revert_in()
                .map_or(remaining, |next| next.min(remaining));
            if let Some(event) = self.pump(wait) {
                events.push(event);
            }
        }
        events
    }

    fn apply(&mut self, message: WorkerMessage) -> Option<SessionEvent> {
        let WorkerMessage { ticket, result } = message;
        let task = ticket.task;
        let result = result.and_then(|timed| match timed.value.task() {
            answered if answered == task => Ok(timed),
            answered => Err(AnalysisError::MalformedResponse {
                task,
                reason: format!("received a {answered} result"),
            }),
        });

        match self.controller.settle(ticket, &result) {
            Settlement::Ignored => {
                log::debug!("Ignoring unexpected {task} result");
                return None;
            }
            Settlement::Stale => {
                log::warn!(
                    "Discarding {task} result for generation {}: image was replaced",
                    ticket.generation
                );
                return Some(SessionEvent::Discarded(task));
            }
            Settlement::Current => {}
        }

        let timed = match result {
            Ok(timed) => timed,
            Err(e) => {
                log::warn!("{task} failed: {e}");
                return Some(self.fail(task, e.user_message()));
            }
        };
        log::info!("{task} completed in {:.2}s", timed.elapsed.as_secs_f64());

        match timed.value {
            AnalysisOutcome::Detection(faces) => {
                let Some(image) = self.controller.current_image() else {
                    return Some(SessionEvent::Discarded(task));
                };
                let decoded = match self.renderer.decode(image) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        log::warn!("{e}");
                        self.controller.restore(Trigger::Detect);
                        return Some(self.fail(task, DISPLAY_ERROR_MESSAGE.to_string()));
                    }
                };
                let scene = self.renderer.render_detection(&decoded, &faces);
                self.surface.present(&decoded, &scene);
                self.controller.show_detection(&faces);
                log::info!("Rendered {} face(s)", faces.face_count());
            }
            AnalysisOutcome::Emotion(emotion) => {
                let badge = self.renderer.render_emotion(&emotion);
                self.controller.show_emotion(&badge);
                log::info!("Emotion: {} ({})", badge.label, badge.confidence);
            }
        }
        Some(SessionEvent::Rendered(task))
    }

    fn fail(&mut self, task: AnalysisTask, message: String) -> SessionEvent {
        self.notifier.alert(&message);
        SessionEvent::Failed { task, message }
    }
}
