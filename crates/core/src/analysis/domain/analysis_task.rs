use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The operation requested from the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisTask {
    Detection,
    Emotion,
}

impl AnalysisTask {
    pub const ALL: &[AnalysisTask] = &[AnalysisTask::Detection, AnalysisTask::Emotion];

    /// Wire name of the task.
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisTask::Detection => "detection",
            AnalysisTask::Emotion => "emotion",
        }
    }
}

impl fmt::Display for AnalysisTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown analysis task '{0}', expected 'detection' or 'emotion'")]
pub struct UnknownTaskError(pub String);

impl FromStr for AnalysisTask {
    type Err = UnknownTaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detection" => Ok(AnalysisTask::Detection),
            "emotion" => Ok(AnalysisTask::Emotion),
            other => Err(UnknownTaskError(other.to_string())),
        }
    }
}
