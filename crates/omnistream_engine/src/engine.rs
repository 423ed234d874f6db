use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::engine_error;
use omnistream_core::{Platform, VideoMetadata};
use tokio_util::sync::CancellationToken;

use crate::{ChannelSink, DistributeError, Distributor, EngineEvent, JobEngine, MediaAsset};

enum EngineCommand {
    Distribute {
        asset: Arc<MediaAsset>,
        metadata: Arc<VideoMetadata>,
        platforms: Vec<Platform>,
    },
}

/// Runs a [`Distributor`] on a background runtime thread and hands events
/// back over a plain channel, for callers that are not async.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(engine: JobEngine) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let distributor = Arc::new(Distributor::new(engine));
        let cancel = distributor.cancel_token();

        thread::Builder::new()
            .name("omnistream-engine".into())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let distributor = distributor.clone();
                    let sink = Arc::new(ChannelSink::new(event_tx.clone()));
                    runtime.spawn(async move {
                        handle_command(distributor.as_ref(), command, sink).await;
                    });
                }
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            cancel,
        })
    }

    /// Validates the request and starts the run in the background.
    pub fn distribute(
        &self,
        asset: Option<Arc<MediaAsset>>,
        metadata: VideoMetadata,
        platforms: &[Platform],
    ) -> Result<(), DistributeError> {
        let platforms = Distributor::plan(asset.as_deref(), platforms)?;
        let asset = asset.ok_or(DistributeError::NoAsset)?;
        self.cmd_tx
            .send(EngineCommand::Distribute {
                asset,
                metadata: Arc::new(metadata),
                platforms,
            })
            .map_err(|_| DistributeError::EngineStopped)
    }

    /// Ends every running job with `Error`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks for the next event; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(distributor: &Distributor, command: EngineCommand, sink: Arc<ChannelSink>) {
    match command {
        EngineCommand::Distribute {
            asset,
            metadata,
            platforms,
        } => {
            if let Err(err) = distributor
                .distribute(Some(asset), metadata, &platforms, sink)
                .await
            {
                engine_error!("distribution rejected: {}", err);
            }
        }
    }
}
