//! IBM adapter errors.

use qsolve_hal::HalError;
use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors raised while talking to IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    /// The session carried no token.
    #[error("IBM Quantum credentials missing: set IBM_QUANTUM_TOKEN, or IBM_API_KEY with IBM_SERVICE_CRN")]
    MissingToken,

    /// The token cannot be used as a header value.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// Exchanging an API key for a bearer token failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error body.
    #[error("IBM Quantum API error: {message}")]
    Api {
        /// Error code, when the API sent one.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Unknown job id.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job ended in a failed state.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job was cancelled: {0}")]
    JobCancelled(String),

    /// Device is unknown or offline.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Response body did not parse.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Circuit needs more qubits than the device has.
    #[error("Circuit requires {required} qubits but backend only has {available}")]
    TooManyQubits {
        /// Qubits needed.
        required: usize,
        /// Qubits available.
        available: usize,
    },

    /// A sample could not be decoded into a bitstring.
    #[error("Malformed sample {sample:?}: {reason}")]
    MalformedSample {
        /// The raw sample text.
        sample: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Request parameter rejected before sending.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<IbmError> for HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken | IbmError::InvalidToken | IbmError::IamTokenExchange(_) => {
                HalError::Auth(e.to_string())
            }
            IbmError::Http(err) => HalError::Network(err),
            IbmError::Json(err) => HalError::Serialization(err),
            IbmError::JobNotFound(id) => HalError::JobNotFound(id),
            IbmError::JobFailed(msg) => HalError::JobFailed(msg),
            IbmError::JobCancelled(_) => HalError::JobCancelled,
            IbmError::BackendUnavailable(name) => HalError::BackendUnavailable(name),
            IbmError::TooManyQubits { .. } => HalError::CircuitTooLarge(e.to_string()),
            IbmError::InvalidParameter(msg) => HalError::Configuration(msg),
            IbmError::Api { .. } | IbmError::MalformedSample { .. } => {
                HalError::Backend(e.to_string())
            }
        }
    }
}
