use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Protocol phases run on an artificial schedule, no network.
    Simulated,
    /// Protocol phases call the platform's real endpoints.
    Authenticated,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::Simulated => f.write_str("simulated"),
            ConnectionMode::Authenticated => f.write_str("authenticated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown connection mode '{0}' (expected simulated or authenticated)")]
pub struct ParseModeError(pub String);

impl FromStr for ConnectionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" | "mock" => Ok(ConnectionMode::Simulated),
            "authenticated" | "real" => Ok(ConnectionMode::Authenticated),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Expired,
}

/// A connected account for one platform.
///
/// Read-only for the engine: it is resolved once per job and never written back.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub platform: Platform,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub mode: ConnectionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub connected_at: DateTime<Utc>,
    pub status: AccountStatus,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// The token to authenticate with, only in authenticated mode and only if non-empty.
    pub fn credential(&self) -> Option<&str> {
        match self.mode {
            ConnectionMode::Authenticated => self
                .access_token
                .as_deref()
                .filter(|token| !token.trim().is_empty()),
            ConnectionMode::Simulated => None,
        }
    }
}

// Tokens stay out of debug output.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("platform", &self.platform)
            .field("username", &self.username)
            .field("mode", &self.mode)
            .field("has_access_token", &self.access_token.is_some())
            .field("connected_at", &self.connected_at)
            .field("status", &self.status)
            .finish()
    }
}
