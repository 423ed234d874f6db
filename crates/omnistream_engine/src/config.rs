use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Engine configuration. Every field has a default, so a config file only
/// needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub http: HttpSettings,
    pub endpoints: Endpoints,
    pub simulation: SimulationSchedule,
    pub copy: CopySettings,
    /// Pause after entering `Authenticating`.
    pub handshake_delay_ms: u64,
    /// Deadline for one job after its account is resolved. `None` disables it.
    pub job_timeout_secs: Option<u64>,
    /// Chunk size for resumable uploads; kept a multiple of 256 KiB.
    pub resumable_chunk_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            endpoints: Endpoints::default(),
            simulation: SimulationSchedule::default(),
            copy: CopySettings::default(),
            handshake_delay_ms: 500,
            job_timeout_secs: Some(30 * 60),
            resumable_chunk_bytes: 8 * 1024 * 1024,
        }
    }
}

impl EngineConfig {
    /// Defaults with every artificial delay removed. Used by tests and demos.
    pub fn instant() -> Self {
        Self {
            simulation: SimulationSchedule::instant(),
            handshake_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Loads `path` if given and present, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn handshake_delay(&self) -> Duration {
        Duration::from_millis(self.handshake_delay_ms)
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_secs.map(Duration::from_secs)
    }

    pub fn resumable_chunk_size(&self) -> usize {
        const QUANTUM: usize = 256 * 1024;
        let chunks = (self.resumable_chunk_bytes / QUANTUM).max(1);
        chunks * QUANTUM
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
        }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Base URLs of the platform APIs. Overridden in tests to point at a mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub douyin: String,
    pub youtube: String,
    pub gemini: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            douyin: "https://open.douyin.com".to_string(),
            youtube: "https://www.googleapis.com".to_string(),
            gemini: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

/// Delays of the simulated protocols, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSchedule {
    pub session_request_ms: u64,
    pub chunk_count: u8,
    pub chunk_ms: u64,
    pub commit_ms: u64,
    pub resumable_init_ms: u64,
    pub stream_steps: u8,
    pub stream_step_ms: u64,
    pub server_processing_ms: u64,
    pub generic_step_ms: u64,
    pub metadata_ms: u64,
}

impl Default for SimulationSchedule {
    fn default() -> Self {
        Self {
            session_request_ms: 800,
            chunk_count: 5,
            chunk_ms: 600,
            commit_ms: 800,
            resumable_init_ms: 1000,
            stream_steps: 5,
            stream_step_ms: 500,
            server_processing_ms: 2000,
            generic_step_ms: 1000,
            metadata_ms: 1500,
        }
    }
}

impl SimulationSchedule {
    pub fn instant() -> Self {
        Self {
            session_request_ms: 0,
            chunk_ms: 0,
            commit_ms: 0,
            resumable_init_ms: 0,
            stream_step_ms: 0,
            server_processing_ms: 0,
            generic_step_ms: 0,
            metadata_ms: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopySettings {
    pub model: String,
    pub tone: String,
    pub language: String,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            tone: "Engaging".to_string(),
            language: "Chinese (Simplified)".to_string(),
        }
    }
}
