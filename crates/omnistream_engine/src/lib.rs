//! OmniStream engine: account storage, per-platform upload protocols and the
//! concurrent distribution of one asset to many platforms.
mod asset;
mod config;
mod copy;
mod engine;
mod http;
mod job_engine;
mod locator;
mod orchestrator;
mod run;
mod sink;
mod store;
mod strategy;
mod types;

pub use asset::{AssetError, MediaAsset};
pub use config::{ConfigError, CopySettings, EngineConfig, Endpoints, HttpSettings, SimulationSchedule};
pub use copy::{CopyError, CopyGenerator, GeminiCopyGenerator};
pub use engine::EngineHandle;
pub use job_engine::JobEngine;
pub use locator::simulated_locator;
pub use orchestrator::Distributor;
pub use run::JobRun;
pub use sink::{ChannelSink, UpdateSink};
pub use store::{
    connect_account, disconnect_account, AccountResolver, AccountStore, FileAccountStore,
    InMemoryAccountStore, StoreError,
};
pub use strategy::{UploadContext, UploadStrategy};
pub use types::{DistributeError, EngineEvent, UploadError};
