use std::time::Duration;

use async_trait::async_trait;
use omnistream_core::{ProtocolFamily, UploadState};

use super::{UploadContext, UploadStrategy};
use crate::{simulated_locator, JobRun, SimulationSchedule, UploadError};

/// Network-free upload that walks a protocol family's phases on a timer.
/// Never fails on its own.
#[derive(Debug, Clone)]
pub(crate) struct SimulatedUpload {
    family: ProtocolFamily,
    schedule: SimulationSchedule,
}

impl SimulatedUpload {
    pub(crate) fn new(family: ProtocolFamily, schedule: SimulationSchedule) -> Self {
        Self { family, schedule }
    }

    async fn chunked(&self, run: &mut JobRun) {
        let s = &self.schedule;
        run.info("Requesting upload session (chunked protocol)...");
        pause(s.session_request_ms).await;
        run.set_state(UploadState::Uploading);

        let chunks = s.chunk_count.max(1);
        for i in 1..=chunks {
            run.info(format!("Uploading chunk {i}/{chunks}..."));
            pause(s.chunk_ms).await;
            run.set_progress(scaled(i, chunks, 80));
        }

        run.info("Committing uploaded parts...");
        pause(s.commit_ms).await;
        run.set_progress(90);
    }

    async fn resumable(&self, run: &mut JobRun) {
        let s = &self.schedule;
        run.info("Initializing resumable upload session...");
        pause(s.resumable_init_ms).await;
        run.set_state(UploadState::Uploading);
        run.info("Streaming data...");

        let steps = s.stream_steps.max(1);
        for i in 1..=steps {
            pause(s.stream_step_ms).await;
            let progress = scaled(i, steps, 90);
            run.set_progress(progress);
            run.info(format!("Transferred {progress}%..."));
        }

        run.info("Processing video on server...");
        pause(s.server_processing_ms).await;
    }

    async fn generic(&self, run: &mut JobRun) {
        let s = &self.schedule;
        run.info("Preparing upload...");
        pause(s.generic_step_ms).await;
        run.set_state(UploadState::Uploading);
        run.set_progress(20);
        run.info("Uploading video file...");
        pause(s.generic_step_ms).await;
        run.set_progress(60);
        run.info("Upload finished, verifying...");
        pause(s.generic_step_ms).await;
        run.set_progress(90);
    }
}

#[async_trait]
impl UploadStrategy for SimulatedUpload {
    async fn upload(&self, run: &mut JobRun, _ctx: &UploadContext<'_>) -> Result<(), UploadError> {
        match self.family {
            ProtocolFamily::Chunked => self.chunked(run).await,
            ProtocolFamily::Resumable => self.resumable(run).await,
            ProtocolFamily::Generic => self.generic(run).await,
        }

        run.info("Submitting video metadata...");
        run.set_state(UploadState::Processing);
        pause(self.schedule.metadata_ms).await;

        let platform = run.job().platform();
        run.complete(
            format!("Published to {platform} (simulated)"),
            Some(simulated_locator(platform)),
        );
        Ok(())
    }
}

fn scaled(step: u8, total: u8, ceiling: u8) -> u8 {
    (u16::from(step) * u16::from(ceiling) / u16::from(total)) as u8
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
