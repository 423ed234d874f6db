//! OmniStream core: job model, platform catalogue and the pure board state
//! machine that observers use to follow a distribution run.
mod account;
mod job;
mod log;
mod metadata;
mod msg;
mod platform;
mod state;
mod summary;
mod update;
mod view_model;

pub use account::{Account, AccountStatus, ConnectionMode, ParseModeError};
pub use job::{Job, JobError, JobId, JobUpdate, UploadState};
pub use log::{JobLog, LogEntry, LogLevel};
pub use metadata::{parse_tags, VideoMetadata};
pub use msg::Msg;
pub use platform::{Platform, PlatformInfo, ProtocolFamily, Region, UnknownPlatform};
pub use state::BoardState;
pub use summary::{RunStatus, RunSummary};
pub use update::update;
pub use view_model::{BoardViewModel, JobRowView};
