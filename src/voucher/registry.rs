use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{MutationOutcome, OptimisticCache};

use super::model::DisbursementVoucher;
use super::store::{StoreError, VoucherStore};

const CACHE_CAPACITY: u64 = 1_000;
const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Saved vouchers, cached in front of a `VoucherStore`.
///
/// Writes land in the cache before the store is touched. If the store
/// rejects a write, the cache goes back to what it held before.
#[derive(Clone)]
pub struct VoucherRegistry {
    cache: OptimisticCache<String, DisbursementVoucher>,
    store: Arc<dyn VoucherStore>,
}

impl VoucherRegistry {
    pub fn new(store: Arc<dyn VoucherStore>) -> Self {
        Self::with_cache(store, OptimisticCache::new(CACHE_CAPACITY, CACHE_TTL))
    }

    pub fn with_cache(
        store: Arc<dyn VoucherStore>,
        cache: OptimisticCache<String, DisbursementVoucher>,
    ) -> Self {
        Self { cache, store }
    }

    pub async fn list(&self) -> Result<Vec<DisbursementVoucher>, StoreError> {
        self.store.list().await
    }

    /// Cached lookup, falling back to the store and warming the cache.
    pub async fn get(&self, voucher_number: &str) -> Result<Option<DisbursementVoucher>, StoreError> {
        let key = voucher_number.to_string();
        if let Some(voucher) = self.cache.read(&key).await {
            log::debug!("Voucher {} served from cache", voucher_number);
            return Ok(Some(voucher));
        }

        let loaded = self.store.load(voucher_number).await?;
        if let Some(ref voucher) = loaded {
            self.cache.write(key, voucher.clone()).await;
        }
        Ok(loaded)
    }

    pub async fn exists(&self, voucher_number: &str) -> Result<bool, StoreError> {
        Ok(self.get(voucher_number).await?.is_some())
    }

    /// Optimistically insert a voucher whose number must not be taken yet.
    ///
    /// A taken number is reported as `StoreError::AlreadyExists` after the
    /// cache has been restored; any other store failure is a rollback.
    pub async fn create(
        &self,
        voucher: DisbursementVoucher,
    ) -> Result<MutationOutcome<DisbursementVoucher>, StoreError> {
        let key = voucher.voucher_number.clone();
        let store = Arc::clone(&self.store);
        let taken = AtomicBool::new(false);
        let conflict = &taken;

        let outcome = self
            .cache
            .mutate(key.clone(), Some(voucher), |next| async move {
                let Some(voucher) = next else {
                    return Ok(());
                };
                let result = store.create(&voucher).await;
                if matches!(result, Err(StoreError::AlreadyExists(_))) {
                    conflict.store(true, Ordering::SeqCst);
                }
                result
            })
            .await;

        if taken.load(Ordering::SeqCst) {
            log::warn!("Voucher {} already exists", key);
            return Err(StoreError::AlreadyExists(key));
        }
        match &outcome {
            MutationOutcome::Committed(_) => log::info!("Voucher {} created", key),
            MutationOutcome::RolledBack { reason, .. } => {
                log::error!("Failed to create voucher {}, cache rolled back: {}", key, reason)
            }
        }
        Ok(outcome)
    }

    pub async fn save(&self, voucher: DisbursementVoucher) -> MutationOutcome<DisbursementVoucher> {
        let key = voucher.voucher_number.clone();
        let store = Arc::clone(&self.store);

        let outcome = self
            .cache
            .mutate(key.clone(), Some(voucher), |next| async move {
                match next {
                    Some(voucher) => store.save(&voucher).await,
                    None => Ok(()),
                }
            })
            .await;

        match &outcome {
            MutationOutcome::Committed(_) => log::info!("Voucher {} saved", key),
            MutationOutcome::RolledBack { reason, .. } => {
                log::error!("Failed to save voucher {}, cache rolled back: {}", key, reason)
            }
        }
        outcome
    }

    pub async fn delete(&self, voucher_number: &str) -> MutationOutcome<DisbursementVoucher> {
        let key = voucher_number.to_string();
        let store = Arc::clone(&self.store);

        let outcome = self
            .cache
            .mutate(key.clone(), None, |_| async move {
                store.delete(&key).await.map(|_| ())
            })
            .await;

        match &outcome {
            MutationOutcome::Committed(_) => log::info!("Voucher {} deleted", voucher_number),
            MutationOutcome::RolledBack { reason, .. } => log::error!(
                "Failed to delete voucher {}, cache rolled back: {}",
                voucher_number,
                reason
            ),
        }
        outcome
    }
}
