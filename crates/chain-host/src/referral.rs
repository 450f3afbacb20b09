//! Referral link status
//!
//! Whether the selected account already has a referrer decides if a swap
//! extrinsic must bundle a `link_code` call. The answer only ever moves from
//! "not linked" to "linked", so it is fetched once and kept for the account.

use std::sync::Arc;

use async_trait::async_trait;
use exchange_core::AccountId;
use tokio::sync::Mutex;

use crate::Result;

/// Reads referral links from chain storage
#[async_trait]
pub trait ReferralStatusService: Send + Sync {
    /// Referrer linked to `account`, if any
    async fn fetch_linked_referrer(&self, account: &AccountId) -> Result<Option<AccountId>>;
}

/// Cached referral status for one account
///
/// Concurrent callers share a single in-flight fetch: the lock is held across
/// the remote call, so later callers wait and read the stored answer. Failed
/// fetches are not stored and the next caller retries.
pub struct ReferralStatusCache {
    service: Arc<dyn ReferralStatusService>,
    account: AccountId,
    linked: Mutex<Option<bool>>,
}

impl ReferralStatusCache {
    pub fn new(service: Arc<dyn ReferralStatusService>, account: AccountId) -> Self {
        Self {
            service,
            account,
            linked: Mutex::new(None),
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub async fn is_linked(&self) -> Result<bool> {
        let mut linked = self.linked.lock().await;
        if let Some(value) = *linked {
            return Ok(value);
        }

        match self.service.fetch_linked_referrer(&self.account).await {
            Ok(referrer) => {
                let value = referrer.is_some();
                tracing::debug!(account = %self.account, linked = value, "Fetched referral status");
                *linked = Some(value);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch referral status for {}: {}", self.account, e);
                Err(e)
            }
        }
    }

    /// Record a successful link so later swaps skip the `link_code` call
    pub async fn mark_linked(&self) {
        *self.linked.lock().await = Some(true);
        tracing::info!(account = %self.account, "Referral code linked");
    }

    /// Stored answer without fetching
    pub async fn cached(&self) -> Option<bool> {
        *self.linked.lock().await
    }
}
