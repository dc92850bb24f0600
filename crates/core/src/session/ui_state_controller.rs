use std::time::Duration;

use crate::analysis::domain::analysis_error::AnalysisError;
use crate::analysis::domain::analysis_result::{AnalysisOutcome, DetectionResult, Timed};
use crate::analysis::domain::analysis_task::AnalysisTask;
use crate::rendering::domain::result_renderer::EmotionBadge;
use crate::session::result_summary::{ProcessingTime, ResultSummary};
use crate::session::revert_scheduler::{Clock, RevertScheduler};
use crate::session::session_state::{PreconditionError, RequestTicket, SessionState};
use crate::session::trigger_control::{Affordance, Trigger, TriggerControl};
use crate::shared::captured_image::CapturedImage;

/// What happened to a finished request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Issued against the current image; its result should be displayed.
    Current,
    /// The image was replaced while the request was pending.
    Stale,
    /// Not the outstanding request for its task.
    Ignored,
}

/// Drives which actions are available and what each control shows.
///
/// Capture is always enabled. Detection and emotion become enabled once an
/// image exists, go busy while their request is pending, and after a
/// successful result show a confirmation label until the revert fires.
pub struct UiStateController {
    state: SessionState,
    capture: TriggerControl,
    detect: TriggerControl,
    emotion: TriggerControl,
    reverts: RevertScheduler<Trigger>,
    confirmation: Duration,
}

impl UiStateController {
    pub fn new(clock: Box<dyn Clock>, confirmation: Duration) -> Self {
        Self {
            state: SessionState::new(),
            capture: TriggerControl::new(Trigger::Capture, true),
            detect: TriggerControl::new(Trigger::Detect, false),
            emotion: TriggerControl::new(Trigger::Emotion, false),
            reverts: RevertScheduler::new(clock),
            confirmation,
        }
    }

    pub fn current_image(&self) -> Option<&CapturedImage> {
        self.state.current_image()
    }

    pub fn summary(&self) -> &ResultSummary {
        self.state.summary()
    }

    pub fn control(&self, trigger: Trigger) -> &TriggerControl {
        match trigger {
            Trigger::Capture => &self.capture,
            Trigger::Detect => &self.detect,
            Trigger::Emotion => &self.emotion,
        }
    }

    pub fn is_enabled(&self, trigger: Trigger) -> bool {
        self.control(trigger).is_enabled()
    }

    pub fn is_in_flight(&self, task: AnalysisTask) -> bool {
        self.state.is_in_flight(task)
    }

    pub fn any_in_flight(&self) -> bool {
        AnalysisTask::ALL.iter().any(|t| self.state.is_in_flight(*t))
    }

    /// A new image replaces the current one and clears all results.
    pub fn on_capture(&mut self, image: CapturedImage) {
        self.state.replace_image(image);

        self.capture.set_confirming(true);
        self.reverts.schedule(Trigger::Capture, self.confirmation);

        for task in AnalysisTask::ALL {
            if self.state.is_in_flight(*task) {
                continue;
            }
            let trigger = Trigger::for_task(*task);
            self.reverts.cancel(trigger);
            self.control_mut(trigger).restore();
        }
    }

    pub fn begin(&mut self, task: AnalysisTask) -> Result<RequestTicket, PreconditionError> {
        if self.state.current_image().is_none() {
            return Err(PreconditionError::NoImage);
        }
        if self.state.is_in_flight(task) {
            return Err(PreconditionError::InFlight(task));
        }
        let trigger = Trigger::for_task(task);
        if !self.is_enabled(trigger) {
            return Err(PreconditionError::Disabled(task));
        }

        let ticket = self.state.begin(task)?;
        self.reverts.cancel(trigger);
        self.control_mut(trigger).set_busy();
        Ok(ticket)
    }

    /// Applies a finished request to the control and processing-time field.
    /// The caller displays the result itself when this returns `Current`.
    pub fn settle(
        &mut self,
        ticket: RequestTicket,
        result: &Result<Timed<AnalysisOutcome>, AnalysisError>,
    ) -> Settlement {
        if !self.state.settle(ticket) {
            return Settlement::Ignored;
        }
        let trigger = Trigger::for_task(ticket.task);

        if !self.state.is_current(ticket) {
            self.control_mut(trigger).restore();
            return Settlement::Stale;
        }

        match result {
            Ok(timed) => {
                self.state.summary_mut().processing_time = ProcessingTime::Measured(timed.elapsed);
                self.control_mut(trigger).set_confirming(false);
                self.reverts.schedule(trigger, self.confirmation);
            }
            Err(e) => {
                self.state.summary_mut().processing_time = e
                    .elapsed()
                    .map_or(ProcessingTime::Failed, ProcessingTime::Measured);
                self.control_mut(trigger).restore();
            }
        }
        Settlement::Current
    }

    pub fn show_detection(&mut self, result: &DetectionResult) {
        self.state.summary_mut().record_detection(result);
    }

    pub fn show_emotion(&mut self, badge: &EmotionBadge) {
        self.state.summary_mut().record_emotion(badge);
    }

    /// Puts a control straight back to ready, dropping any pending revert.
    pub fn restore(&mut self, trigger: Trigger) {
        self.reverts.cancel(trigger);
        self.control_mut(trigger).restore();
    }

    /// Fires every due revert and returns the triggers it touched.
    pub fn tick(&mut self) -> Vec<Trigger> {
        let due = self.reverts.take_due();
        for trigger in &due {
            let control = self.control_mut(*trigger);
            if control.affordance() == Affordance::Confirming {
                control.restore();
            }
        }
        due
    }

    pub fn next_revert_in(&self) -> Option<Duration> {
        self.reverts.next_deadline()
    }

    fn control_mut(&mut self, trigger: Trigger) -> &mut TriggerControl {
        match trigger {
            Trigger::Capture => &mut self.capture,
            Trigger::Detect => &mut self.detect,
            Trigger::Emotion => &mut self.emotion,
        }
    }
}
