use std::collections::HashMap;
use std::sync::RwLock;

use omnistream_core::{Account, Platform};

use super::{AccountStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<Platform, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| (account.platform, account))
            .collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, platform: Platform) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| StoreError::Poisoned)?;
        Ok(accounts.get(&platform).cloned())
    }

    fn put(&self, account: Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().map_err(|_| StoreError::Poisoned)?;
        accounts.insert(account.platform, account);
        Ok(())
    }

    fn delete(&self, platform: Platform) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.write().map_err(|_| StoreError::Poisoned)?;
        Ok(accounts.remove(&platform).is_some())
    }

    fn list(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| StoreError::Poisoned)?;
        let mut list: Vec<Account> = accounts.values().cloned().collect();
        list.sort_by_key(|account| account.platform);
        Ok(list)
    }
}
