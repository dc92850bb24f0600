use std::fmt;
use std::time::Duration;

use crate::analysis::domain::analysis_result::{DetectionResult, NOT_AVAILABLE};
use crate::rendering::domain::result_renderer::EmotionBadge;

pub const PLACEHOLDER: &str = "--";
pub const ERROR_MARKER: &str = "Error";
pub const HIGH_CONFIDENCE: &str = "High";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingTime {
    #[default]
    Unset,
    Measured(Duration),
    Failed,
}

impl fmt::Display for ProcessingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingTime::Unset => f.write_str(PLACEHOLDER),
            ProcessingTime::Measured(d) => write!(f, "{:.2}s", d.as_secs_f64()),
            ProcessingTime::Failed => f.write_str(ERROR_MARKER),
        }
    }
}

/// The summary fields shown next to the annotated view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub face_count: usize,
    pub confidence: String,
    pub processing_time: ProcessingTime,
    pub emotion_badge: String,
    /// False while the empty-state placeholder is showing.
    pub annotation_visible: bool,
}

impl Default for ResultSummary {
    fn default() -> Self {
        Self {
            face_count: 0,
            confidence: PLACEHOLDER.to_string(),
            processing_time: ProcessingTime::Unset,
            emotion_badge: String::new(),
            annotation_visible: false,
        }
    }
}

impl ResultSummary {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn record_detection(&mut self, result: &DetectionResult) {
        self.face_count = result.face_count();
        self.confidence = if result.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            HIGH_CONFIDENCE.to_string()
        };
        self.annotation_visible = true;
    }

    pub fn record_emotion(&mut self, badge: &EmotionBadge) {
        self.emotion_badge = badge.label.clone();
        self.confidence = badge.confidence.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::face_box::FaceBox;
    use rstest::rstest;

    #[rstest]
    #[case::unset(ProcessingTime::Unset, "--")]
    #[case::measured(ProcessingTime::Measured(Duration::from_millis(1234)), "1.23s")]
    #[case::rounds(ProcessingTime::Measured(Duration::from_millis(5)), "0.01s")]
    #[case::failed(ProcessingTime::Failed, "Error")]
    fn test_processing_time_display(#[case] time: ProcessingTime, #[case] expected: &str) {
        assert_eq!(time.to_string(), expected);
    }

    #[test]
    fn test_initial_placeholders() {
        let s = ResultSummary::default();
        assert_eq!(s.face_count, 0);
        assert_eq!(s.confidence, "--");
        assert_eq!(s.processing_time.to_string(), "--");
        assert_eq!(s.emotion_badge, "");
        assert!(!s.annotation_visible);
    }

    #[test]
    fn test_record_detection_with_faces() {
        let mut s = ResultSummary::default();
        s.record_detection(&DetectionResult::new(vec![FaceBox::new(0, 0, 5, 5)]));
        assert_eq!(s.face_count, 1);
        assert_eq!(s.confidence, "High");
        assert!(s.annotation_visible);
    }

    #[test]
    fn test_record_detection_without_faces() {
        let mut s = ResultSummary::default();
        s.record_detection(&DetectionResult::default());
        assert_eq!(s.face_count, 0);
        assert_eq!(s.confidence, "N/A");
        assert!(s.annotation_visible);
    }

    #[test]
    fn test_reset_restores_placeholders() {
        let mut s = ResultSummary::default();
        s.record_emotion(&EmotionBadge {
            label: "Happy".into(),
            confidence: "92%".into(),
        });
        s.processing_time = ProcessingTime::Failed;
        s.reset();
        assert_eq!(s, ResultSummary::default());
    }
}
