#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use omnistream_core::{
    Account, AccountStatus, ConnectionMode, JobId, JobUpdate, Platform, VideoMetadata,
};
use omnistream_engine::{EngineEvent, MediaAsset, UpdateSink};

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn updates_for(&self, job_id: JobId) -> Vec<JobUpdate> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::JobUpdated { job_id: id, update } if id == job_id => Some(update),
                _ => None,
            })
            .collect()
    }
}

impl UpdateSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}

pub fn asset() -> MediaAsset {
    MediaAsset::new("launch.mp4", vec![7u8; 64]).unwrap()
}

pub fn metadata() -> VideoMetadata {
    VideoMetadata::new(
        "Launch day",
        "Behind the scenes",
        vec!["launch".into(), "demo".into()],
    )
}

pub fn account(platform: Platform, mode: ConnectionMode, token: Option<&str>) -> Account {
    Account {
        platform,
        username: "creator".into(),
        avatar: None,
        mode,
        access_token: token.map(str::to_string),
        refresh_token: None,
        connected_at: chrono::Utc::now(),
        status: AccountStatus::Active,
    }
}
