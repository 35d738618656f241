//! Process-wide cache of slow-changing reference data
//!
//! Account types are immutable for the lifetime of an account and asset
//! rows change only through administrative operations, so both are safe to
//! cache across requests. Negative results are never cached: an absent
//! asset may be registered at any moment.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::query::AssetRecord;
use crate::types::{AccountAddress, AccountType, Asset};

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that fell through to the backing store
    pub misses: u64,
}

/// Shared cache of account types and asset rows
#[derive(Debug, Default)]
pub struct SharedCache {
    account_types: DashMap<AccountAddress, AccountType>,
    assets: DashMap<Asset, AssetRecord>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SharedCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached account type, if known
    pub fn account_type(&self, address: &AccountAddress) -> Option<AccountType> {
        let found = self.account_types.get(address).map(|e| *e.value());
        self.count(found.is_some());
        found
    }

    /// Records the type of an account
    pub fn remember_account_type(&self, address: AccountAddress, account_type: AccountType) {
        self.account_types.insert(address, account_type);
    }

    /// Cached asset row, if known
    pub fn asset_record(&self, asset: &Asset) -> Option<AssetRecord> {
        let found = self.assets.get(asset).map(|e| e.value().clone());
        self.count(found.is_some());
        found
    }

    /// Records an asset row
    pub fn remember_asset(&self, record: AssetRecord) {
        self.assets.insert(record.asset.clone(), record);
    }

    /// Drops a cached asset row, forcing the next lookup to re-read it
    pub fn invalidate_asset(&self, asset: &Asset) {
        if self.assets.remove(asset).is_some() {
            debug!(%asset, "cached asset row invalidated");
        }
    }

    /// Hit/miss counters since startup
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn count(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }
}
