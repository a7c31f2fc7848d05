//! Job identifiers and the job state machine.
//!
//! ```text
//!   Queued ──→ Running ──→ Completed
//!     │           ├──────→ Failed(reason)
//!     └───────────┴──────→ Cancelled
//! ```

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Provider-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    /// Carries the provider's reason.
    Failed(String),
    Cancelled,
}

impl JobStatus {
    /// Completed, failed or cancelled.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_become(&self, next: &JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Queued, _) => true,
            (JobStatus::Running, JobStatus::Queued) => false,
            (JobStatus::Running, _) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => f.write_str("queued"),
            JobStatus::Running => f.write_str("running"),
            JobStatus::Completed => f.write_str("completed"),
            JobStatus::Failed(reason) => write!(f, "failed ({reason})"),
            JobStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Bookkeeping for a job a backend tracks locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub shots: u32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<JobId>, shots: u32) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            shots,
            created_at: Utc::now(),
            finished_at: None,
            backend: None,
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Apply `status` if the state machine allows it. Returns whether the
    /// status changed; the finish time is stamped on entering a terminal
    /// state.
    pub fn transition(&mut self, status: JobStatus) -> bool {
        if !self.status.can_become(&status) {
            return false;
        }
        self.status = status;
        if self.status.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        true
    }

    /// Time from creation to the terminal state, once there.
    pub fn duration(&self) -> Option<TimeDelta> {
        self.finished_at.map(|done| done - self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates_and_display() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed("calibration".into()).is_terminal());
        assert!(JobStatus::Running.is_pending());
        assert!(!JobStatus::Cancelled.is_pending());
        assert_eq!(
            JobStatus::Failed("calibration".into()).to_string(),
            "failed (calibration)"
        );
    }

    #[test]
    fn test_terminal_states_are_permanent() {
        let mut job = Job::new("job-1", 1024).with_backend("simulator");
        assert!(job.duration().is_none());

        assert!(job.transition(JobStatus::Running));
        assert!(!job.transition(JobStatus::Queued));
        assert!(job.transition(JobStatus::Completed));
        assert!(job.duration().is_some_and(|d| d >= TimeDelta::zero()));

        assert!(!job.transition(JobStatus::Cancelled));
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[test]
    fn test_job_id_serializes_as_string() {
        let json = serde_json::to_string(&JobId::new("c1x2")).unwrap();
        assert_eq!(json, "\"c1x2\"");
    }
}
