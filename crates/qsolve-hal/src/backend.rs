//! The backend seam.
//!
//! A job moves through `submit -> status* -> result`. `wait_with` drives
//! that loop for callers that only want the final counts, polling at the
//! [`WaitPolicy`] interval until the job is terminal or the policy's
//! deadline passes.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use qsolve_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// How [`Backend::wait_with`] polls for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between status polls.
    pub poll_interval: Duration,
    /// Give up after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: None,
        }
    }
}

impl WaitPolicy {
    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set a timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Something that runs measured circuits and reports counts.
///
/// `capabilities` is cached at construction and never touches the network.
/// `result` is only meaningful once `status` has reported `Completed`.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    /// Check width and gate set before paying for a submission.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Queue `shots` executions of `circuit`.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Wait for a job with the default policy: 500ms polls, no timeout.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.wait_with(job_id, WaitPolicy::default()).await
    }

    /// Poll a job until it reaches a terminal state.
    async fn wait_with(&self, job_id: &JobId, policy: WaitPolicy) -> HalResult<ExecutionResult> {
        let deadline = policy
            .timeout
            .map(|timeout| tokio::time::Instant::now() + timeout);
        let mut polls = 0u32;

        loop {
            polls += 1;
            let status = self.status(job_id).await?;
            debug!(job = %job_id, %status, polls, "polled job");

            match status {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(reason) => return Err(HalError::JobFailed(reason)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {}
            }

            if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
                return Err(HalError::Timeout(job_id.0.clone()));
            }
            tokio::time::sleep(policy.poll_interval).await;
        }
    }
}

/// Outcome of [`Backend::validate`].
#[derive(Debug, Clone)]
pub enum ValidationResult {
    Valid,
    Invalid { reasons: Vec<String> },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}
