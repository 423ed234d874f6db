use std::sync::Arc;

use engine_logging::{engine_debug, engine_error};
use omnistream_core::{Job, JobId, JobUpdate, LogEntry, UploadState};

use crate::{EngineEvent, UpdateSink, UploadError};

/// A job being driven by the engine.
///
/// Every change goes through [`Job::apply`] first and is emitted to the sink
/// only when it was accepted and changed something, one update per event.
pub struct JobRun {
    job: Job,
    sink: Arc<dyn UpdateSink>,
}

impl JobRun {
    pub fn new(job: Job, sink: Arc<dyn UpdateSink>) -> Self {
        Self { job, sink }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn id(&self) -> JobId {
        self.job.id()
    }

    pub fn into_job(self) -> Job {
        self.job
    }

    pub fn set_state(&mut self, state: UploadState) {
        self.push(JobUpdate::State(state));
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.push(JobUpdate::Progress(progress.min(100)));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(LogEntry::info(message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.log(LogEntry::warning(message));
    }

    pub fn log(&mut self, entry: LogEntry) {
        self.push(JobUpdate::Log(entry));
    }

    pub fn set_result(&mut self, url: impl Into<String>) {
        self.push(JobUpdate::ResultUrl(url.into()));
    }

    /// Finishes the job successfully. `Success` is always the last update emitted.
    pub fn complete(&mut self, message: impl Into<String>, result_url: Option<String>) {
        self.set_progress(100);
        self.log(LogEntry::success(message));
        if let Some(url) = result_url {
            self.set_result(url);
        }
        self.set_state(UploadState::Success);
    }

    /// Finishes the job with `err`. Progress stays where it stopped.
    pub fn fail(&mut self, err: &UploadError) {
        if let Some(hint) = err.remediation() {
            self.warning(hint);
        }
        self.log(LogEntry::error(format!("Upload failed: {err}")));
        self.push(JobUpdate::ErrorMessage(err.to_string()));
        self.set_state(UploadState::Error);
    }

    fn push(&mut self, update: JobUpdate) {
        match self.job.apply(update.clone()) {
            Ok(true) => {
                if let JobUpdate::State(state) = &update {
                    engine_debug!("job {} -> {}", self.job.id(), state);
                }
                self.sink.emit(EngineEvent::JobUpdated {
                    job_id: self.job.id(),
                    update,
                });
            }
            Ok(false) => {}
            Err(err) => engine_error!("job {} rejected update {:?}: {}", self.job.id(), update, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use omnistream_core::{LogLevel, Platform};

    use super::*;

    fn recording() -> (Arc<Mutex<Vec<EngineEvent>>>, Arc<dyn UpdateSink>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let captured = events.clone();
        let sink: Arc<dyn UpdateSink> =
            Arc::new(move |event: EngineEvent| captured.lock().unwrap().push(event));
        (events, sink)
    }

    fn updates(events: &Mutex<Vec<EngineEvent>>) -> Vec<JobUpdate> {
        events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::JobUpdated { update, .. } => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn complete_emits_success_last() {
        let (events, sink) = recording();
        let mut run = JobRun::new(Job::new(7, Platform::X), sink);
        run.set_state(UploadState::Uploading);
        run.complete("Published", Some("https://x.com/video/1".into()));

        let updates = updates(&events);
        assert_eq!(updates.last(), Some(&JobUpdate::State(UploadState::Success)));
        assert!(updates.contains(&JobUpdate::Progress(100)));
        assert_eq!(run.job().result_url(), Some("https://x.com/video/1"));
    }

    #[test]
    fn fail_logs_hint_then_error_and_freezes_progress() {
        let (events, sink) = recording();
        let mut run = JobRun::new(Job::new(1, Platform::Kuaishou), sink);
        run.set_state(UploadState::Uploading);
        run.set_progress(40);
        run.fail(&UploadError::UnsupportedProtocol(Platform::Kuaishou));

        let job = run.into_job();
        assert_eq!(job.state(), UploadState::Error);
        assert_eq!(job.progress(), 40);
        let levels: Vec<_> = job.log().iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![LogLevel::Warning, LogLevel::Error]);
        assert_eq!(
            updates(&events).last(),
            Some(&JobUpdate::State(UploadState::Error))
        );
    }

    #[test]
    fn rejected_and_noop_updates_are_not_emitted() {
        let (events, sink) = recording();
        let mut run = JobRun::new(Job::new(1, Platform::Bilibili), sink);
        run.set_state(UploadState::Uploading);
        run.set_state(UploadState::Uploading);
        run.set_progress(50);
        run.set_progress(20);
        run.fail(&UploadError::NotConnected);
        run.info("after terminal");

        assert_eq!(updates(&events).len(), 5);
        assert_eq!(run.job().progress(), 50);
    }
}
