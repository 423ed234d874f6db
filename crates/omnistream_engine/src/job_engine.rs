use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use omnistream_core::{ConnectionMode, Job, Platform, ProtocolFamily, UploadState, VideoMetadata};
use tokio_util::sync::CancellationToken;

use crate::strategy::{DouyinUpload, SimulatedUpload, YouTubeUpload};
use crate::{
    AccountResolver, EngineConfig, JobRun, MediaAsset, UpdateSink, UploadContext, UploadError,
    UploadStrategy,
};

/// Drives a single job from `Queued` to a terminal state.
pub struct JobEngine {
    resolver: Arc<dyn AccountResolver>,
    simulated: HashMap<ProtocolFamily, Arc<dyn UploadStrategy>>,
    real: HashMap<Platform, Arc<dyn UploadStrategy>>,
    handshake_delay: Duration,
    job_timeout: Option<Duration>,
}

impl JobEngine {
    pub fn new(config: &EngineConfig, resolver: Arc<dyn AccountResolver>) -> Self {
        let simulated = [
            ProtocolFamily::Chunked,
            ProtocolFamily::Resumable,
            ProtocolFamily::Generic,
        ]
        .into_iter()
        .map(|family| {
            let strategy: Arc<dyn UploadStrategy> =
                Arc::new(SimulatedUpload::new(family, config.simulation.clone()));
            (family, strategy)
        })
        .collect();

        let mut real: HashMap<Platform, Arc<dyn UploadStrategy>> = HashMap::new();
        real.insert(
            Platform::Douyin,
            Arc::new(DouyinUpload::new(
                config.endpoints.douyin.clone(),
                config.http.clone(),
            )),
        );
        real.insert(
            Platform::YouTube,
            Arc::new(YouTubeUpload::new(
                config.endpoints.youtube.clone(),
                config.http.clone(),
                config.resumable_chunk_size(),
            )),
        );

        Self {
            resolver,
            simulated,
            real,
            handshake_delay: config.handshake_delay(),
            job_timeout: config.job_timeout(),
        }
    }

    /// Runs `job` to completion and returns it terminal.
    ///
    /// Every failure is recorded on the job exactly once here. A job that is
    /// not `Queued` is returned untouched.
    pub async fn run(
        &self,
        job: Job,
        asset: &MediaAsset,
        metadata: &VideoMetadata,
        sink: Arc<dyn UpdateSink>,
        cancel: &CancellationToken,
    ) -> Job {
        if job.state() != UploadState::Queued {
            engine_warn!(
                "job {} is {} and will not be run again",
                job.id(),
                job.state()
            );
            return job;
        }

        let platform = job.platform();
        let mut run = JobRun::new(job, sink);

        let Some(account) = self.resolver.resolve(platform) else {
            run.fail(&UploadError::NotConnected);
            engine_warn!("job {} ({}) has no connected account", run.id(), platform);
            return run.into_job();
        };

        run.set_state(UploadState::Authenticating);
        let label = match account.mode {
            ConnectionMode::Authenticated => "authenticated",
            ConnectionMode::Simulated => "simulated",
        };
        run.info(format!("Initializing {label} session for {platform}..."));

        let credential = account.credential();
        let strategy = match credential {
            Some(_) => self.real.get(&platform).cloned(),
            None => {
                if account.mode == ConnectionMode::Authenticated {
                    run.warning("No access token stored for this account; running simulated upload.");
                }
                self.simulated.get(&platform.protocol_family()).cloned()
            }
        };

        let ctx = UploadContext {
            asset,
            metadata,
            credential,
        };
        let outcome = self
            .drive(&mut run, strategy, &ctx, credential.is_some(), cancel)
            .await;

        match outcome {
            Ok(()) if run.job().state() == UploadState::Success => {
                engine_info!("job {} ({}) published", run.id(), platform);
            }
            Ok(()) => {
                let err = UploadError::Unexpected(format!(
                    "upload for {platform} ended in state {}",
                    run.job().state()
                ));
                engine_warn!("job {} ({}) failed: {}", run.id(), platform, err);
                run.fail(&err);
            }
            Err(err) => {
                engine_warn!("job {} ({}) failed: {}", run.id(), platform, err);
                run.fail(&err);
            }
        }
        run.into_job()
    }

    async fn drive(
        &self,
        run: &mut JobRun,
        strategy: Option<Arc<dyn UploadStrategy>>,
        ctx: &UploadContext<'_>,
        real: bool,
        cancel: &CancellationToken,
    ) -> Result<(), UploadError> {
        let platform = run.job().platform();
        pause(self.handshake_delay, cancel).await?;

        let strategy = match (strategy, real) {
            (Some(strategy), true) => {
                run.info(format!("[Real API] Connecting to {platform} endpoints..."));
                strategy
            }
            (Some(strategy), false) => strategy,
            (None, true) => return Err(UploadError::UnsupportedProtocol(platform)),
            (None, false) => {
                return Err(UploadError::Unexpected(format!(
                    "no simulated protocol for {platform}"
                )))
            }
        };

        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        let upload = strategy.upload(run, ctx);
        let bounded = async {
            match self.job_timeout {
                Some(limit) => tokio::time::timeout(limit, upload)
                    .await
                    .unwrap_or(Err(UploadError::TimedOut(limit))),
                None => upload.await,
            }
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(UploadError::Cancelled),
            result = bounded => result,
        }
    }
}

async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<(), UploadError> {
    if cancel.is_cancelled() {
        return Err(UploadError::Cancelled);
    }
    if delay.is_zero() {
        return Ok(());
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(UploadError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
