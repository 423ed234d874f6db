use std::fmt;

use crate::{Job, UploadState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every job succeeded.
    Complete,
    /// At least one job succeeded and at least one failed.
    Partial,
    /// No job succeeded.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Complete => f.write_str("Complete"),
            RunStatus::Partial => f.write_str("Partial"),
            RunStatus::Failed => f.write_str("Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub status: RunStatus,
}

impl RunSummary {
    /// Returns `None` while any job is still running, or if there are no jobs.
    pub fn from_jobs<'a, I>(jobs: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Job>,
    {
        let mut total = 0;
        let mut succeeded = 0;
        let mut failed = 0;
        for job in jobs {
            total += 1;
            match job.state() {
                UploadState::Success => succeeded += 1,
                UploadState::Error => failed += 1,
                _ => return None,
            }
        }
        if total == 0 {
            return None;
        }

        let status = if failed == 0 {
            RunStatus::Complete
        } else if succeeded == 0 {
            RunStatus::Failed
        } else {
            RunStatus::Partial
        };
        Some(Self {
            total,
            succeeded,
            failed,
            status,
        })
    }
}
