use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::document::{GeneratedDocument, LogoSet, VoucherLayoutEngine, VoucherPdfGenerator};
use crate::metrics::DocumentMetrics;
use crate::voucher::{FileVoucherStore, StoreError, VoucherRegistry, VoucherStore};

const PREVIEW_CAPACITY: u64 = 200;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to register document metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<VoucherPdfGenerator>,
    /// Rendered previews, addressed by the id in their URL until they expire.
    pub previews: Cache<Uuid, Arc<GeneratedDocument>>,
    pub registry: VoucherRegistry,
    pub metrics: DocumentMetrics,
}

impl AppState {
    /// Build state from config, opening the file store under `store_dir`.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StateError> {
        let store = FileVoucherStore::open(&config.store_dir).await?;
        let logos =
            LogoSet::load(config.left_logo.as_deref(), config.right_logo.as_deref()).await;
        let generator = VoucherPdfGenerator::new(
            VoucherLayoutEngine::new(config.organization.clone()),
            logos,
        );
        Self::new(generator, Arc::new(store), config.preview_ttl)
    }

    pub fn new(
        generator: VoucherPdfGenerator,
        store: Arc<dyn VoucherStore>,
        preview_ttl: Duration,
    ) -> Result<Self, StateError> {
        let previews = Cache::builder()
            .time_to_live(preview_ttl)
            .max_capacity(PREVIEW_CAPACITY)
            .build();

        Ok(Self {
            generator: Arc::new(generator),
            previews,
            registry: VoucherRegistry::new(store),
            metrics: DocumentMetrics::new()?,
        })
    }
}
