use std::time::Duration;

use omnistream_core::{Job, JobId, JobUpdate, Msg, Platform};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A distribution run was admitted; job creation follows.
    RunStarted { job_count: usize },
    /// A job was created in `Queued`.
    JobCreated(Job),
    /// One observable change to a job.
    JobUpdated { job_id: JobId, update: JobUpdate },
    /// Every job of the run is terminal.
    RunFinished,
}

impl From<EngineEvent> for Msg {
    fn from(event: EngineEvent) -> Self {
        match event {
            EngineEvent::RunStarted { .. } => Msg::RunStarted,
            EngineEvent::JobCreated(job) => Msg::JobCreated(job),
            EngineEvent::JobUpdated { job_id, update } => Msg::JobUpdated { job_id, update },
            EngineEvent::RunFinished => Msg::RunFinished,
        }
    }
}

/// Why a job ended in `Error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("account not connected")]
    NotConnected,
    #[error("Real API support for {0} is under development. Please use simulated mode.")]
    UnsupportedProtocol(Platform),
    #[error("Network error: {message}")]
    Transport { message: String },
    #[error("{platform} API error: {message}")]
    PlatformApi {
        platform: Platform,
        status: Option<u16>,
        message: String,
    },
    #[error("unexpected error: {0}")]
    Unexpected(String),
    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("cancelled")]
    Cancelled,
}

impl UploadError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        UploadError::Transport {
            message: message.into(),
        }
    }

    pub(crate) fn api(platform: Platform, status: Option<u16>, message: impl Into<String>) -> Self {
        UploadError::PlatformApi {
            platform,
            status,
            message: message.into(),
        }
    }

    /// User-facing hint logged as a warning before the terminal error entry.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            UploadError::UnsupportedProtocol(_) => Some(
                "Tip: reconnect this account in simulated mode to publish without the real API.",
            ),
            UploadError::Transport { .. } => Some(
                "Tip: check the network connection, that the endpoint accepts requests from this host (CORS/firewall), and that the access token is valid.",
            ),
            UploadError::PlatformApi { .. } => {
                Some("Tip: ensure your access token is valid and has upload permission.")
            }
            UploadError::TimedOut(_) => {
                Some("Tip: raise job_timeout_secs in the configuration for large uploads.")
            }
            UploadError::NotConnected | UploadError::Unexpected(_) | UploadError::Cancelled => None,
        }
    }
}

/// Reasons a distribution request is refused before any job exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DistributeError {
    #[error("no platforms selected")]
    NoPlatforms,
    #[error("no media asset provided")]
    NoAsset,
    #[error("engine is not running")]
    EngineStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_protocol_mentions_development_and_simulated_mode() {
        let err = UploadError::UnsupportedProtocol(Platform::Bilibili);
        let text = err.to_string();
        assert!(text.contains("under development"));
        assert!(text.contains("Bilibili"));
        assert!(err.remediation().unwrap().contains("simulated mode"));
    }

    #[test]
    fn transport_and_api_errors_have_different_hints() {
        let transport = UploadError::transport("connection refused");
        let api = UploadError::api(Platform::YouTube, Some(401), "HTTP 401: bad token");
        assert_ne!(transport.remediation(), api.remediation());
        assert_eq!(api.to_string(), "YouTube API error: HTTP 401: bad token");
    }

    #[test]
    fn not_connected_has_no_hint() {
        assert!(UploadError::NotConnected.remediation().is_none());
    }

    #[test]
    fn timeout_renders_seconds() {
        assert_eq!(
            UploadError::TimedOut(Duration::from_secs(90)).to_string(),
            "timed out after 90s"
        );
    }
}
