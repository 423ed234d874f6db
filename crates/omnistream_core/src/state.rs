use std::collections::BTreeMap;

use crate::view_model::{BoardViewModel, JobRowView};
use crate::{Job, JobId, JobUpdate, RunSummary};

/// Observer-side mirror of a distribution run, built only from engine events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardState {
    jobs: BTreeMap<JobId, Job>,
    finished: bool,
    ignored_updates: usize,
    dirty: bool,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> BoardViewModel {
        let rows = self
            .jobs
            .values()
            .map(|job| JobRowView {
                job_id: job.id(),
                platform: job.platform(),
                state: job.state(),
                progress: job.progress(),
                last_log: job.log().last().cloned(),
                log_len: job.log().len(),
                result_url: job.result_url().map(ToOwned::to_owned),
                error_message: job.error_message().map(ToOwned::to_owned),
            })
            .collect::<Vec<_>>();

        BoardViewModel {
            job_count: rows.len(),
            rows,
            finished: self.finished,
            summary: self.summary(),
            ignored_updates: self.ignored_updates,
            dirty: self.dirty,
        }
    }

    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.get(&job_id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    /// Summary of the run once every job is terminal.
    pub fn summary(&self) -> Option<RunSummary> {
        RunSummary::from_jobs(self.jobs.values())
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn start_run(&mut self) {
        self.jobs.clear();
        self.finished = false;
        self.ignored_updates = 0;
        self.dirty = true;
    }

    pub(crate) fn insert_job(&mut self, job: Job) {
        self.jobs.insert(job.id(), job);
        self.dirty = true;
    }

    pub(crate) fn apply_update(&mut self, job_id: JobId, update: JobUpdate) {
        let Some(job) = self.jobs.get_mut(&job_id) else {
            self.ignored_updates += 1;
            return;
        };
        match job.apply(update) {
            Ok(changed) => self.dirty |= changed,
            Err(_) => self.ignored_updates += 1,
        }
    }

    pub(crate) fn finish_run(&mut self) {
        self.finished = true;
        self.dirty = true;
    }
}
