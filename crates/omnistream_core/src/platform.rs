use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    Douyin,
    Kuaishou,
    Xiaohongshu,
    WeChatChannels,
    Bilibili,
    X,
    TikTok,
    YouTube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Cn,
    Global,
}

/// Upload shape shared by a group of platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFamily {
    /// Session request, sequential chunk parts, commit.
    Chunked,
    /// Resumable session, streamed transfer, server-side processing.
    Resumable,
    /// Everything else.
    Generic,
}

/// Static catalogue entry for a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub platform: Platform,
    pub display_name: &'static str,
    pub region: Region,
    pub supported_formats: &'static [&'static str],
    pub max_duration_secs: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}'")]
pub struct UnknownPlatform(pub String);

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::Douyin,
        Platform::Kuaishou,
        Platform::Xiaohongshu,
        Platform::WeChatChannels,
        Platform::Bilibili,
        Platform::X,
        Platform::TikTok,
        Platform::YouTube,
    ];

    /// Stable identifier, also used in result locators and store keys.
    pub fn id(self) -> &'static str {
        match self {
            Platform::Douyin => "Douyin",
            Platform::Kuaishou => "Kuaishou",
            Platform::Xiaohongshu => "Xiaohongshu",
            Platform::WeChatChannels => "WeChatChannels",
            Platform::Bilibili => "Bilibili",
            Platform::X => "X",
            Platform::TikTok => "TikTok",
            Platform::YouTube => "YouTube",
        }
    }

    pub fn info(self) -> PlatformInfo {
        let (display_name, region, supported_formats, max_duration_secs): (
            &'static str,
            Region,
            &'static [&'static str],
            Option<u32>,
        ) = match self {
            Platform::Douyin => ("抖音", Region::Cn, &["mp4", "mov"][..], Some(900)),
            Platform::Kuaishou => ("快手", Region::Cn, &["mp4", "mov", "flv"][..], None),
            Platform::Xiaohongshu => ("小红书", Region::Cn, &["mp4", "mov"][..], None),
            Platform::WeChatChannels => ("视频号", Region::Cn, &["mp4"][..], None),
            Platform::Bilibili => ("Bilibili", Region::Cn, &["mp4", "flv", "avi"][..], None),
            Platform::X => ("X (Twitter)", Region::Global, &["mp4", "mov"][..], None),
            Platform::TikTok => ("TikTok", Region::Global, &["mp4", "mov"][..], None),
            Platform::YouTube => ("YouTube", Region::Global, &["mp4", "mov", "avi", "wmv"][..], None),
        };
        PlatformInfo {
            platform: self,
            display_name,
            region,
            supported_formats,
            max_duration_secs,
        }
    }

    pub fn protocol_family(self) -> ProtocolFamily {
        match self {
            Platform::Douyin | Platform::TikTok => ProtocolFamily::Chunked,
            Platform::YouTube => ProtocolFamily::Resumable,
            _ => ProtocolFamily::Generic,
        }
    }

    /// Whether authenticated mode talks to the platform's real API.
    pub fn has_real_protocol(self) -> bool {
        matches!(self, Platform::Douyin | Platform::YouTube)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(platform) = Platform::ALL
            .iter()
            .copied()
            .find(|p| p.id().eq_ignore_ascii_case(trimmed))
        {
            return Ok(platform);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "wechat" | "channels" => Ok(Platform::WeChatChannels),
            "twitter" => Ok(Platform::X),
            "xhs" | "rednote" => Ok(Platform::Xiaohongshu),
            _ => Err(UnknownPlatform(trimmed.to_string())),
        }
    }
}
