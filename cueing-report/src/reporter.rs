use crate::error::ReportError;
use crate::payload::Submission;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/proxy";

/// Delivers a finished session somewhere durable.
pub trait ResultReporter: Send {
    /// Returns the server's JSON acknowledgement.
    fn submit(&self, submission: &Submission) -> Result<serde_json::Value, ReportError>;
}

/// POSTs the submission as JSON; only a 2xx reply with a JSON body counts
/// as delivered.
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpReporter {
    pub fn new(endpoint: &str) -> Result<Self, ReportError> {
        Self::with_timeout(endpoint, Duration::from_secs(30))
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ReportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ReportError::Transport {
                url: endpoint.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ResultReporter for HttpReporter {
    fn submit(&self, submission: &Submission) -> Result<serde_json::Value, ReportError> {
        info!(
            endpoint = %self.endpoint,
            participant = %submission.participant,
            trials = submission.results.len(),
            "submitting results"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(submission)
            .send()
            .map_err(|source| ReportError::Transport {
                url: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "submission rejected");
            return Err(ReportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json().map_err(ReportError::InvalidBody)
    }
}
