//! JSON bodies exchanged with the analysis service.
//!
//! `POST /process` carries `{ "image": <data URL>, "task": <task> }` and is
//! answered by `{ "faces": [...] }` or `{ "emotion": ..., "confidence"?: ... }`.
//! Non-success answers may carry `{ "detail": <string> }`.

use serde::{Deserialize, Serialize};

use crate::analysis::domain::analysis_result::{AnalysisOutcome, DetectionResult, EmotionResult};
use crate::analysis::domain::analysis_task::AnalysisTask;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub image: String,
    pub task: AnalysisTask,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub fn parse_outcome(task: AnalysisTask, body: &[u8]) -> Result<AnalysisOutcome, serde_json::Error> {
    Ok(match task {
        AnalysisTask::Detection => {
            AnalysisOutcome::Detection(serde_json::from_slice::<DetectionResult>(body)?)
        }
        AnalysisTask::Emotion => {
            AnalysisOutcome::Emotion(serde_json::from_slice::<EmotionResult>(body)?)
        }
    })
}

/// The `detail` message of an error body, if it is a string.
///
/// Validation failures carry a list of issues under `detail`; those are
/// not human readable and yield `None`.
pub fn parse_error_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(str::to_string)
}
