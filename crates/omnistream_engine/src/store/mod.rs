//! Account storage. The engine only reads accounts through [`AccountResolver`];
//! connecting and disconnecting happen outside a distribution run.
use chrono::Utc;
use engine_logging::engine_warn;
use omnistream_core::{Account, AccountStatus, ConnectionMode, Platform};
use thiserror::Error;

mod file;
mod memory;

pub use file::FileAccountStore;
pub use memory::InMemoryAccountStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("account file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("account store lock poisoned")]
    Poisoned,
}

pub trait AccountStore: Send + Sync {
    fn get(&self, platform: Platform) -> Result<Option<Account>, StoreError>;
    /// Inserts or replaces the account for its platform.
    fn put(&self, account: Account) -> Result<(), StoreError>;
    /// Returns whether an account was removed.
    fn delete(&self, platform: Platform) -> Result<bool, StoreError>;
    fn list(&self) -> Result<Vec<Account>, StoreError>;
}

/// Read-only account lookup used by job runs.
pub trait AccountResolver: Send + Sync {
    fn resolve(&self, platform: Platform) -> Option<Account>;

    fn is_connected(&self, platform: Platform) -> bool {
        self.resolve(platform).is_some()
    }
}

/// Only active accounts resolve. A failing store reads as "not connected".
impl<S: AccountStore + ?Sized> AccountResolver for S {
    fn resolve(&self, platform: Platform) -> Option<Account> {
        match self.get(platform) {
            Ok(account) => account.filter(Account::is_active),
            Err(err) => {
                engine_warn!("account lookup for {} failed: {}", platform, err);
                None
            }
        }
    }
}

/// Connects `platform`, replacing any existing account for it.
///
/// Simulated accounts get a demo profile. Authenticated accounts keep the
/// supplied token; an empty token is stored as none.
pub fn connect_account(
    store: &dyn AccountStore,
    platform: Platform,
    mode: ConnectionMode,
    access_token: Option<String>,
) -> Result<Account, StoreError> {
    let (username, avatar) = match mode {
        ConnectionMode::Simulated => (
            demo_username(platform).to_string(),
            Some(format!(
                "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
                platform.id()
            )),
        ),
        ConnectionMode::Authenticated => (format!("{}_Dev_User", platform.id()), None),
    };
    let access_token = match mode {
        ConnectionMode::Authenticated => access_token.filter(|token| !token.trim().is_empty()),
        ConnectionMode::Simulated => None,
    };

    let account = Account {
        platform,
        username,
        avatar,
        mode,
        access_token,
        refresh_token: None,
        connected_at: Utc::now(),
        status: AccountStatus::Active,
    };
    store.put(account.clone())?;
    Ok(account)
}

pub fn disconnect_account(store: &dyn AccountStore, platform: Platform) -> Result<bool, StoreError> {
    store.delete(platform)
}

fn demo_username(platform: Platform) -> &'static str {
    match platform {
        Platform::Douyin => "抖音创作者",
        Platform::Kuaishou => "快手达人",
        Platform::Xiaohongshu => "小红书博主",
        Platform::WeChatChannels => "视频号主理人",
        Platform::Bilibili => "B站UP主",
        Platform::X => "@omnistream_demo",
        Platform::TikTok => "@omnistream.creator",
        Platform::YouTube => "OmniStream Studio",
    }
}
