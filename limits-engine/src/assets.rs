//! Asset allow-list validator
//!
//! Issued assets must be registered by the administrative subsystem before
//! they can move. The validator reads through the shared cache; negative
//! answers are never cached because an asset may be registered at any
//! moment. The native ledger token is always known and never anonymous.

use gateway_core::{Asset, AssetRecord, HistoryQuery, SharedCache};

use crate::error::Result;

/// Checks assets against the administered allow-list
pub struct AssetsValidator<'a> {
    history: &'a dyn HistoryQuery,
    cache: &'a SharedCache,
}

impl<'a> AssetsValidator<'a> {
    /// Validator reading the allow-list from `history` through `cache`
    pub fn new(history: &'a dyn HistoryQuery, cache: &'a SharedCache) -> Self {
        Self { history, cache }
    }

    /// Allow-list row of `asset`, `None` when unregistered.
    ///
    /// The native token yields a synthetic non-anonymous row.
    pub async fn record(&self, asset: &Asset) -> Result<Option<AssetRecord>> {
        if asset.is_native() {
            return Ok(Some(AssetRecord {
                asset: Asset::Native,
                is_anonymous: false,
            }));
        }
        if let Some(record) = self.cache.asset_record(asset) {
            return Ok(Some(record));
        }
        let record = self.history.asset(asset).await?;
        if let Some(record) = &record {
            self.cache.remember_asset(record.clone());
        }
        Ok(record)
    }

    /// True when `asset` may move on this ledger
    pub async fn is_known(&self, asset: &Asset) -> Result<bool> {
        Ok(self.record(asset).await?.is_some())
    }

    /// True when `asset` is registered and flagged anonymous
    pub async fn is_anonymous(&self, asset: &Asset) -> Result<bool> {
        Ok(self
            .record(asset)
            .await?
            .map(|r| r.is_anonymous)
            .unwrap_or(false))
    }
}
