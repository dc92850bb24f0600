use std::time::{Duration, Instant};

use crate::analysis::domain::analysis_client::AnalysisClient;
use crate::analysis::domain::analysis_error::AnalysisError;
use crate::analysis::domain::analysis_result::{AnalysisOutcome, Timed};
use crate::analysis::domain::analysis_task::AnalysisTask;
use crate::analysis::infrastructure::wire::{self, HealthResponse, ProcessRequest};
use crate::shared::captured_image::CapturedImage;
use crate::shared::constants::{HEALTH_PATH, PROCESS_PATH};

/// Talks to the analysis service over HTTP with a blocking `reqwest` client.
///
/// No timeout is applied unless one is configured; the transport default
/// governs otherwise.
pub struct HttpAnalysisClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, AnalysisError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Asks the service whether it is up; returns its status line.
    pub fn health(&self) -> Result<String, AnalysisError> {
        let url = self.endpoint(HEALTH_PATH);
        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                detail: wire::parse_error_detail(&body),
                elapsed: started.elapsed(),
            });
        }
        let health: HealthResponse = serde_json::from_slice(&body)
            .map_err(|e| AnalysisError::Transport(format!("invalid health response: {e}")))?;
        Ok(health.status)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl AnalysisClient for HttpAnalysisClient {
    fn analyze(
        &self,
        image: &CapturedImage,
        task: AnalysisTask,
    ) -> Result<Timed<AnalysisOutcome>, AnalysisError> {
        let url = self.endpoint(PROCESS_PATH);
        let request = ProcessRequest {
            image: image.to_data_url(),
            task,
        };
        log::info!(
            "POST {url} task={task} image={} bytes (generation {})",
            image.len(),
            image.generation()
        );

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        let elapsed = started.elapsed();

        if !status.is_success() {
            let detail = wire::parse_error_detail(&body);
            log::warn!("Backend error ({status}): {detail:?}");
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                detail,
                elapsed,
            });
        }

        let value = wire::parse_outcome(task, &body).map_err(|e| {
            AnalysisError::MalformedResponse {
                task,
                reason: e.to_string(),
            }
        })?;
        log::debug!("{task} answered in {:.2}s", elapsed.as_secs_f64());
        Ok(Timed { value, elapsed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = HttpAnalysisClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint(PROCESS_PATH), "http://localhost:8000/process");
    }
}
