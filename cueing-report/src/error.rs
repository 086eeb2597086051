use cueing_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid subject: {0}")]
    Subject(#[from] CoreError),
    #[error("could not reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("server reply was not JSON: {0}")]
    InvalidBody(#[source] reqwest::Error),
}

impl ReportError {
    /// True when retrying the same payload could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReportError::Subject(_) => false,
            ReportError::Status { status, .. } => *status >= 500,
            ReportError::Transport { .. } | ReportError::InvalidBody(_) => true,
        }
    }
}
