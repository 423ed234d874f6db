//! Upload protocols. A strategy drives one job from `Uploading` to a terminal
//! success; failures are returned and recorded by the caller.
use async_trait::async_trait;
use omnistream_core::VideoMetadata;

use crate::{JobRun, MediaAsset, UploadError};

mod douyin;
mod simulated;
mod youtube;

pub(crate) use douyin::DouyinUpload;
pub(crate) use simulated::SimulatedUpload;
pub(crate) use youtube::YouTubeUpload;

/// Inputs shared by every phase of one upload.
pub struct UploadContext<'a> {
    pub asset: &'a MediaAsset,
    pub metadata: &'a VideoMetadata,
    /// Access token for real protocols; `None` for simulated runs.
    pub credential: Option<&'a str>,
}

#[async_trait]
pub trait UploadStrategy: Send + Sync {
    /// Runs the protocol. On `Ok` the job must have reached `Success`.
    async fn upload(&self, run: &mut JobRun, ctx: &UploadContext<'_>) -> Result<(), UploadError>;
}

pub(crate) fn require_credential<'a>(ctx: &UploadContext<'a>) -> Result<&'a str, UploadError> {
    ctx.credential.ok_or(UploadError::NotConnected)
}
