use thiserror::Error;

use crate::analysis::domain::analysis_task::AnalysisTask;
use crate::session::result_summary::ResultSummary;
use crate::shared::captured_image::CapturedImage;

pub const NO_IMAGE_MESSAGE: &str = "Please capture a photo first!";

/// An analysis action that was refused locally, before any network call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Please capture a photo first!")]
    NoImage,
    #[error("{0} is already in progress")]
    InFlight(AnalysisTask),
    #[error("{0} is not available right now")]
    Disabled(AnalysisTask),
}

/// Identifies one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    pub task: AnalysisTask,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight(RequestTicket),
}

/// The current image, per-task request state and summary fields.
#[derive(Default)]
pub struct SessionState {
    image: Option<CapturedImage>,
    detection: RequestState,
    emotion: RequestState,
    summary: ResultSummary,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    pub fn current_generation(&self) -> Option<u64> {
        self.image.as_ref().map(CapturedImage::generation)
    }

    /// Makes `image` current and clears every displayed result.
    /// Outstanding requests are left alone.
    pub fn replace_image(&mut self, image: CapturedImage) {
        self.image = Some(image);
        self.summary.reset();
    }

    pub fn request_state(&self, task: AnalysisTask) -> RequestState {
        match task {
            AnalysisTask::Detection => self.detection,
            AnalysisTask::Emotion => self.emotion,
        }
    }

    pub fn is_in_flight(&self, task: AnalysisTask) -> bool {
        matches!(self.request_state(task), RequestState::InFlight(_))
    }

    pub fn begin(&mut self, task: AnalysisTask) -> Result<RequestTicket, PreconditionError> {
        let generation = self.current_generation().ok_or(PreconditionError::NoImage)?;
        if self.is_in_flight(task) {
            return Err(PreconditionError::InFlight(task));
        }
        let ticket = RequestTicket { task, generation };
        *self.slot(task) = RequestState::InFlight(ticket);
        Ok(ticket)
    }

    /// Marks `ticket` finished. Returns false if it was not the outstanding
    /// request for its task.
    pub fn settle(&mut self, ticket: RequestTicket) -> bool {
        let slot = self.slot(ticket.task);
        if *slot != RequestState::InFlight(ticket) {
            return false;
        }
        *slot = RequestState::Idle;
        true
    }

    /// True if `ticket` was issued against the image that is current now.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.current_generation() == Some(ticket.generation)
    }

    pub fn summary(&self) -> &ResultSummary {
        &self.summary
    }

    pub fn summary_mut(&mut self) -> &mut ResultSummary {
        &mut self.summary
    }

    fn slot(&mut self, task: AnalysisTask) -> &mut RequestState {
        match task {
            AnalysisTask::Detection => &mut self.detection,
            AnalysisTask::Emotion => &mut self.emotion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::result_summary::ProcessingTime;
    use crate::shared::captured_image::JPEG_MIME;
    use std::time::Duration;

    fn image(generation: u64) -> CapturedImage {
        CapturedImage::new(vec![1, 2, 3], JPEG_MIME, 4, 4, generation)
    }

    #[test]
    fn test_begin_without_image_is_rejected() {
        let mut state = SessionState::new();
        assert_eq!(
            state.begin(AnalysisTask::Detection),
            Err(PreconditionError::NoImage)
        );
        assert!(!state.is_in_flight(AnalysisTask::Detection));
    }

    #[test]
    fn test_no_image_message() {
        assert_eq!(PreconditionError::NoImage.to_string(), NO_IMAGE_MESSAGE);
    }

    #[test]
    fn test_second_begin_same_task_is_in_flight() {
        let mut state = SessionState::new();
        state.replace_image(image(1));
        state.begin(AnalysisTask::Emotion).unwrap();
        assert_eq!(
            state.begin(AnalysisTask::Emotion),
            Err(PreconditionError::InFlight(AnalysisTask::Emotion))
        );
    }

    #[test]
    fn test_tasks_are_independent() {
        let mut state = SessionState::new();
        state.replace_image(image(1));
        state.begin(AnalysisTask::Detection).unwrap();
        assert!(state.begin(AnalysisTask::Emotion).is_ok());
    }

    #[test]
    fn test_settle_only_matching_ticket() {
        let mut state = SessionState::new();
        state.replace_image(image(3));
        let ticket = state.begin(AnalysisTask::Detection).unwrap();
        assert_eq!(ticket.generation, 3);

        let other = RequestTicket {
            task: AnalysisTask::Detection,
            generation: 2,
        };
        assert!(!state.settle(other));
        assert!(state.settle(ticket));
        assert!(!state.settle(ticket));
        assert_eq!(state.request_state(AnalysisTask::Detection), RequestState::Idle);
    }

    #[test]
    fn test_replace_image_resets_summary_and_makes_old_tickets_stale() {
        let mut state = SessionState::new();
        state.replace_image(image(1));
        let ticket = state.begin(AnalysisTask::Detection).unwrap();
        state.summary_mut().face_count = 4;
        state.summary_mut().processing_time = ProcessingTime::Measured(Duration::from_secs(1));

        state.replace_image(image(2));
        assert_eq!(state.summary(), &ResultSummary::default());
        assert!(state.is_in_flight(AnalysisTask::Detection));
        assert!(!state.is_current(ticket));
    }
}
