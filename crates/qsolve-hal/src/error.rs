//! HAL errors.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    // Credentials and selection.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// No device passed the selection filter. Raised before any job is
    /// submitted.
    #[error("Configuration error: no backend satisfies {filter} ({candidates} candidates inspected)")]
    NoMatchingBackend { filter: String, candidates: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Backend {0} is not available")]
    BackendUnavailable(String),

    #[error("{0} is not supported")]
    Unsupported(String),

    // Circuit checks done before submission.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    #[error("Circuit too large: {0}")]
    CircuitTooLarge(String),

    #[error("Invalid shot count: {0}")]
    InvalidShots(String),

    // Job lifecycle.
    #[error("Submission rejected: {0}")]
    SubmissionFailed(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Job was cancelled")]
    JobCancelled,

    #[error("Unknown job {0}")]
    JobNotFound(String),

    #[error("Gave up waiting for job {0}")]
    Timeout(String),

    /// Provider-side failure with no closer match above.
    #[error("Backend error: {0}")]
    Backend(String),

    // Transport.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_backend_is_configuration_error() {
        let err = HalError::NoMatchingBackend {
            filter: "n_qubits >= 3, hardware only, operational".into(),
            candidates: 4,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Configuration error"));
        assert!(msg.contains("n_qubits >= 3"));
        assert!(msg.contains("4 candidates"));
    }

    #[test]
    fn test_backend_error_display() {
        assert_eq!(
            HalError::Backend("job c1x2 not yet completed".into()).to_string(),
            "Backend error: job c1x2 not yet completed"
        );
    }

    #[test]
    fn test_timeout_names_the_job() {
        assert_eq!(
            HalError::Timeout("c1x2".into()).to_string(),
            "Gave up waiting for job c1x2"
        );
    }
}
