use crate::EngineEvent;

/// Receiver of engine events. Called concurrently from every job task of a run.
pub trait UpdateSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

impl<F> UpdateSink for F
where
    F: Fn(EngineEvent) + Send + Sync,
{
    fn emit(&self, event: EngineEvent) {
        self(event)
    }
}

pub struct ChannelSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl UpdateSink for ChannelSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}
