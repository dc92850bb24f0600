use std::time::Duration;

use thiserror::Error;

use crate::analysis::domain::analysis_task::AnalysisTask;

pub const CONNECTION_ERROR_MESSAGE: &str =
    "Connection error. Please check if the backend is running.";
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown error occurred";

/// Why one analysis exchange failed. Every variant is terminal for the
/// exchange: nothing is retried and no partial result exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error(
        "server responded with status {status}: {}",
        .detail.as_deref().unwrap_or(UNKNOWN_SERVER_ERROR)
    )]
    Server {
        status: u16,
        detail: Option<String>,
        elapsed: Duration,
    },
    #[error("malformed {task} response: {reason}")]
    MalformedResponse { task: AnalysisTask, reason: String },
}

impl AnalysisError {
    /// Text for the user-facing alert.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Transport(_) | AnalysisError::MalformedResponse { .. } => {
                CONNECTION_ERROR_MESSAGE.to_string()
            }
            AnalysisError::Server { detail, .. } => {
                format!(
                    "Error: {}",
                    detail.as_deref().unwrap_or(UNKNOWN_SERVER_ERROR)
                )
            }
        }
    }

    /// Round-trip time, known only when the server answered.
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            AnalysisError::Server { elapsed, .. } => Some(*elapsed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(detail: Option<&str>) -> AnalysisError {
        AnalysisError::Server {
            status: 400,
            detail: detail.map(str::to_string),
            elapsed: Duration::from_millis(250),
        }
    }

    #[test]
    fn test_server_detail_is_surfaced_verbatim() {
        assert_eq!(server(Some("Invalid image")).user_message(), "Error: Invalid image");
    }

    #[test]
    fn test_server_without_detail_uses_generic_message() {
        assert_eq!(server(None).user_message(), "Error: Unknown error occurred");
        assert_eq!(
            server(None).to_string(),
            "server responded with status 400: Unknown error occurred"
        );
    }

    #[test]
    fn test_transport_uses_connectivity_message() {
        let err = AnalysisError::Transport("connection refused".into());
        assert_eq!(err.user_message(), CONNECTION_ERROR_MESSAGE);
        assert_eq!(err.elapsed(), None);
    }

    #[test]
    fn test_malformed_response_reads_as_connectivity_problem() {
        let err = AnalysisError::MalformedResponse {
            task: AnalysisTask::Detection,
            reason: "missing field `faces`".into(),
        };
        assert_eq!(err.user_message(), CONNECTION_ERROR_MESSAGE);
        assert_eq!(err.elapsed(), None);
    }

    #[test]
    fn test_server_error_keeps_elapsed() {
        assert_eq!(server(None).elapsed(), Some(Duration::from_millis(250)));
    }
}
