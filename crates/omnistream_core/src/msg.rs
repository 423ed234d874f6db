use crate::{Job, JobId, JobUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A new distribution run started; rows of the previous run are dropped.
    RunStarted,
    /// Engine created a job in `Queued`.
    JobCreated(Job),
    /// Engine changed one field of a job.
    JobUpdated { job_id: JobId, update: JobUpdate },
    /// Every job of the run reached a terminal state.
    RunFinished,
}
