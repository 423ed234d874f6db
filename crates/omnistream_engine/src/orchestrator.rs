use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use engine_logging::{engine_error, engine_info};
use futures_util::future::join_all;
use omnistream_core::{Job, JobId, JobUpdate, LogEntry, Platform, UploadState, VideoMetadata};
use tokio_util::sync::CancellationToken;

use crate::{DistributeError, EngineEvent, JobEngine, MediaAsset, UpdateSink};

/// Fans one asset out to many platforms, one concurrent task per job.
pub struct Distributor {
    engine: Arc<JobEngine>,
    next_job_id: AtomicU64,
    cancel: CancellationToken,
}

impl Distributor {
    pub fn new(engine: JobEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            next_job_id: AtomicU64::new(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Cancelling this token ends every running and future job with `Error`.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Checks a request before any job exists. Duplicate platforms collapse
    /// to their first occurrence.
    pub fn plan(
        asset: Option<&MediaAsset>,
        platforms: &[Platform],
    ) -> Result<Vec<Platform>, DistributeError> {
        if platforms.is_empty() {
            return Err(DistributeError::NoPlatforms);
        }
        if asset.is_none() {
            return Err(DistributeError::NoAsset);
        }
        let mut unique = Vec::with_capacity(platforms.len());
        for platform in platforms {
            if !unique.contains(platform) {
                unique.push(*platform);
            }
        }
        Ok(unique)
    }

    /// Runs one distribution and returns once every job is terminal.
    ///
    /// Observers follow the run through `sink`; the returned jobs are the
    /// terminal records in platform order.
    pub async fn distribute(
        &self,
        asset: Option<Arc<MediaAsset>>,
        metadata: Arc<VideoMetadata>,
        platforms: &[Platform],
        sink: Arc<dyn UpdateSink>,
    ) -> Result<Vec<Job>, DistributeError> {
        let platforms = Self::plan(asset.as_deref(), platforms)?;
        let asset = asset.ok_or(DistributeError::NoAsset)?;

        engine_info!(
            "distributing {} ({:.2}MB) to {} platform(s)",
            asset.file_name(),
            asset.size_mb(),
            platforms.len()
        );
        sink.emit(EngineEvent::RunStarted {
            job_count: platforms.len(),
        });

        let jobs: Vec<Job> = platforms
            .iter()
            .map(|platform| Job::new(self.next_job_id.fetch_add(1, Ordering::Relaxed), *platform))
            .collect();
        for job in &jobs {
            sink.emit(EngineEvent::JobCreated(job.clone()));
        }

        let mirror = Arc::new(MirrorSink::new(sink.clone(), &jobs));
        let task_sink: Arc<dyn UpdateSink> = mirror.clone();
        let run_cancel = self.cancel.child_token();
        let handles: Vec<_> = jobs
            .iter()
            .map(|job| {
                let engine = self.engine.clone();
                let asset = asset.clone();
                let metadata = metadata.clone();
                let sink = task_sink.clone();
                let cancel = run_cancel.clone();
                let job = job.clone();
                tokio::spawn(async move {
                    engine
                        .run(job, asset.as_ref(), metadata.as_ref(), sink, &cancel)
                        .await
                })
            })
            .collect();

        let results = join_all(handles).await;
        let finished: Vec<Job> = results
            .into_iter()
            .zip(jobs)
            .map(|(result, job)| match result {
                Ok(finished) => finished,
                Err(err) => {
                    engine_error!("job {} task aborted: {}", job.id(), err);
                    abort_job(mirror.snapshot(&job), &err.to_string(), sink.as_ref())
                }
            })
            .collect();

        sink.emit(EngineEvent::RunFinished);
        Ok(finished)
    }
}

/// Forwards events and keeps the last known record of every job, so a job
/// whose task dies can still be closed out from where it stopped.
struct MirrorSink {
    inner: Arc<dyn UpdateSink>,
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl MirrorSink {
    fn new(inner: Arc<dyn UpdateSink>, jobs: &[Job]) -> Self {
        let jobs = jobs.iter().map(|job| (job.id(), job.clone())).collect();
        Self {
            inner,
            jobs: Mutex::new(jobs),
        }
    }

    fn snapshot(&self, job: &Job) -> Job {
        let jobs = self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        jobs.get(&job.id()).cloned().unwrap_or_else(|| job.clone())
    }
}

impl UpdateSink for MirrorSink {
    fn emit(&self, event: EngineEvent) {
        if let EngineEvent::JobUpdated { job_id, update } = &event {
            let mut jobs = self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(job) = jobs.get_mut(job_id) {
                let _ = job.apply(update.clone());
            }
        }
        self.inner.emit(event);
    }
}

/// Terminal record for a job whose task died without finishing it.
/// Progress and log reached before the failure are kept.
fn abort_job(mut job: Job, reason: &str, sink: &dyn UpdateSink) -> Job {
    let message = format!("Upload failed: task aborted ({reason})");
    let job_id = job.id();
    for update in [
        JobUpdate::Log(LogEntry::error(message.clone())),
        JobUpdate::ErrorMessage(message),
        JobUpdate::State(UploadState::Error),
    ] {
        if job.apply(update.clone()).unwrap_or(false) {
            sink.emit(EngineEvent::JobUpdated { job_id, update });
        }
    }
    job
}
