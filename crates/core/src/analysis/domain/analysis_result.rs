use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::domain::analysis_task::AnalysisTask;
use crate::shared::face_box::FaceBox;

/// Shown wherever a value the service may omit is absent.
pub const NOT_AVAILABLE: &str = "N/A";

/// Faces found in a captured image, in the order the service reported them.
///
/// An empty list means no faces were found; it is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub faces: Vec<FaceBox>,
}

impl DetectionResult {
    pub fn new(faces: Vec<FaceBox>) -> Self {
        Self { faces }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Confidence as sent by the service: free text ("92%") or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Text(String),
    Number(f64),
}

impl Confidence {
    /// Empty text and zero carry no information and display as absent.
    pub fn is_blank(&self) -> bool {
        match self {
            Confidence::Text(s) => s.is_empty(),
            Confidence::Number(n) => *n == 0.0 || n.is_nan(),
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Text(s) => f.write_str(s),
            Confidence::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The dominant emotion label, displayed exactly as the service sent it
/// (including sentinels such as `no_face`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub emotion: String,
    #[serde(default)]
    pub confidence: Option<Confidence>,
}

impl EmotionResult {
    pub fn new(emotion: impl Into<String>, confidence: Option<Confidence>) -> Self {
        Self {
            emotion: emotion.into(),
            confidence,
        }
    }

    pub fn confidence_display(&self) -> String {
        match &self.confidence {
            Some(c) if !c.is_blank() => c.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Detection(DetectionResult),
    Emotion(EmotionResult),
}

impl AnalysisOutcome {
    pub fn task(&self) -> AnalysisTask {
        match self {
            AnalysisOutcome::Detection(_) => AnalysisTask::Detection,
            AnalysisOutcome::Emotion(_) => AnalysisTask::Emotion,
        }
    }
}

/// A value together with the wall-clock time it took to obtain.
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::text(Some(Confidence::Text("92%".into())), "92%")]
    #[case::number(Some(Confidence::Number(0.87)), "0.87")]
    #[case::absent(None, "N/A")]
    #[case::empty_text(Some(Confidence::Text(String::new())), "N/A")]
    #[case::zero(Some(Confidence::Number(0.0)), "N/A")]
    fn test_confidence_display(#[case] confidence: Option<Confidence>, #[case] expected: &str) {
        let result = EmotionResult::new("happy", confidence);
        assert_eq!(result.confidence_display(), expected);
    }

    #[test]
    fn test_confidence_accepts_string_or_number() {
        let a: EmotionResult =
            serde_json::from_str(r#"{"emotion": "Happy", "confidence": "92%"}"#).unwrap();
        let b: EmotionResult =
            serde_json::from_str(r#"{"emotion": "Sad", "confidence": 0.5}"#).unwrap();
        let c: EmotionResult = serde_json::from_str(r#"{"emotion": "no_face"}"#).unwrap();
        assert_eq!(a.confidence, Some(Confidence::Text("92%".into())));
        assert_eq!(b.confidence, Some(Confidence::Number(0.5)));
        assert_eq!(c.confidence, None);
    }

    #[test]
    fn test_fractional_confidence_survives_parsing() {
        let r: EmotionResult =
            serde_json::from_str(r#"{"emotion": "Neutral", "confidence": 0.8734}"#).unwrap();
        match r.confidence {
            Some(Confidence::Number(n)) => approx::assert_relative_eq!(n, 0.8734),
            other => panic!("expected numeric confidence, got {other:?}"),
        }
    }

    #[test]
    fn test_outcome_task() {
        let d = AnalysisOutcome::Detection(DetectionResult::default());
        let e = AnalysisOutcome::Emotion(EmotionResult::new("happy", None));
        assert_eq!(d.task(), AnalysisTask::Detection);
        assert_eq!(e.task(), AnalysisTask::Emotion);
    }

    #[test]
    fn test_face_count() {
        let r = DetectionResult::new(vec![FaceBox::new(0, 0, 1, 1), FaceBox::new(2, 2, 1, 1)]);
        assert_eq!(r.face_count(), 2);
        assert!(!r.is_empty());
        assert!(DetectionResult::default().is_empty());
    }
}
