use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{JobLog, LogEntry, Platform};

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UploadState {
    Queued,
    Authenticating,
    Uploading,
    Processing,
    Success,
    Error,
}

impl UploadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadState::Success | UploadState::Error)
    }

    /// Position in the progression; both terminal states share the last rank.
    fn rank(self) -> u8 {
        match self {
            UploadState::Queued => 0,
            UploadState::Authenticating => 1,
            UploadState::Uploading => 2,
            UploadState::Processing => 3,
            UploadState::Success | UploadState::Error => 4,
        }
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UploadState::Queued => "queued",
            UploadState::Authenticating => "authenticating",
            UploadState::Uploading => "uploading",
            UploadState::Processing => "processing",
            UploadState::Success => "success",
            UploadState::Error => "error",
        };
        f.write_str(label)
    }
}

/// A single observable change to a job. One update per change, never batched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobUpdate {
    State(UploadState),
    Progress(u8),
    Log(LogEntry),
    ResultUrl(String),
    ErrorMessage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("job {job_id} is already terminal ({state})")]
    Terminal { job_id: JobId, state: UploadState },
    #[error("invalid transition {from} -> {to}")]
    InvalidTransition { from: UploadState, to: UploadState },
    #[error("progress may not go from {from} to {to}")]
    ProgressRegression { from: u8, to: u8 },
    #[error("progress {0} is out of range")]
    ProgressOutOfRange(u8),
    #[error("success requires progress 100, job is at {0}")]
    SuccessBeforeComplete(u8),
    #[error("a failed job cannot carry a result locator")]
    ResultOnFailure,
}

/// One platform-scoped upload attempt.
///
/// Mutation goes through [`Job::apply`], which rejects anything that would
/// break the job invariants: no change after a terminal state, progress never
/// decreases, `Success` only at progress 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    platform: Platform,
    state: UploadState,
    progress: u8,
    log: JobLog,
    result_url: Option<String>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, platform: Platform) -> Self {
        Self {
            id,
            platform,
            state: UploadState::Queued,
            progress: 0,
            log: JobLog::new(),
            result_url: None,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn log(&self) -> &JobLog {
        &self.log
    }

    pub fn result_url(&self) -> Option<&str> {
        self.result_url.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Merges one update into the job.
    ///
    /// Returns `Ok(false)` when the update is accepted but changes nothing
    /// (same state or same progress), `Ok(true)` when it changed the job.
    pub fn apply(&mut self, update: JobUpdate) -> Result<bool, JobError> {
        if self.is_terminal() {
            return Err(JobError::Terminal {
                job_id: self.id,
                state: self.state,
            });
        }

        match update {
            JobUpdate::State(next) => {
                if next == self.state {
                    return Ok(false);
                }
                if next.rank() < self.state.rank() {
                    return Err(JobError::InvalidTransition {
                        from: self.state,
                        to: next,
                    });
                }
                if next == UploadState::Success && self.progress != 100 {
                    return Err(JobError::SuccessBeforeComplete(self.progress));
                }
                if next == UploadState::Error && self.result_url.is_some() {
                    return Err(JobError::ResultOnFailure);
                }
                self.state = next;
            }
            JobUpdate::Progress(value) => {
                if value > 100 {
                    return Err(JobError::ProgressOutOfRange(value));
                }
                if value < self.progress {
                    return Err(JobError::ProgressRegression {
                        from: self.progress,
                        to: value,
                    });
                }
                if value == self.progress {
                    return Ok(false);
                }
                self.progress = value;
            }
            JobUpdate::Log(entry) => self.log.push(entry),
            JobUpdate::ResultUrl(url) => self.result_url = Some(url),
            JobUpdate::ErrorMessage(message) => self.error_message = Some(message),
        }
        Ok(true)
    }
}
