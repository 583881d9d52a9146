//! Durable storage for voucher records.
//!
//! `FileVoucherStore` keeps one JSON document per voucher under a root
//! directory. File names are the trimmed voucher number in unpadded
//! URL-safe base64, so `DV/2024/001` and `DV2024001` never share a file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use thiserror::Error;
use uuid::Uuid;

use super::model::DisbursementVoucher;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("voucher store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("voucher record is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("voucher number '{0}' cannot be used as a record name")]
    InvalidKey(String),
    #[error("voucher '{0}' already exists")]
    AlreadyExists(String),
}

/// Longest encoded name kept under the usual 255-byte file name limit.
const MAX_RECORD_NAME: usize = 240;

#[async_trait]
pub trait VoucherStore: Send + Sync {
    /// Insert a new record; fails with `AlreadyExists` if the number is taken.
    async fn create(&self, voucher: &DisbursementVoucher) -> Result<(), StoreError>;
    /// Insert or replace a record.
    async fn save(&self, voucher: &DisbursementVoucher) -> Result<(), StoreError>;
    async fn load(&self, voucher_number: &str) -> Result<Option<DisbursementVoucher>, StoreError>;
    /// Returns whether a record existed.
    async fn delete(&self, voucher_number: &str) -> Result<bool, StoreError>;
    /// All records, ordered by voucher number.
    async fn list(&self) -> Result<Vec<DisbursementVoucher>, StoreError>;
}

pub struct FileVoucherStore {
    root: PathBuf,
}

impl FileVoucherStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        log::info!("Voucher store ready at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, voucher_number: &str) -> Result<PathBuf, StoreError> {
        let number = voucher_number.trim();
        let name = URL_SAFE_NO_PAD.encode(number);
        if number.is_empty() || name.len() > MAX_RECORD_NAME {
            return Err(StoreError::InvalidKey(voucher_number.to_string()));
        }
        Ok(self.root.join(format!("{name}.json")))
    }

    /// Write the record to a uniquely named file beside `path`.
    async fn write_temp(&self, path: &Path, voucher: &DisbursementVoucher) -> Result<PathBuf, StoreError> {
        let json = serde_json::to_vec_pretty(voucher)?;
        let temp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp, &json).await?;
        Ok(temp)
    }
}

#[async_trait]
impl VoucherStore for FileVoucherStore {
    async fn create(&self, voucher: &DisbursementVoucher) -> Result<(), StoreError> {
        let path = self.record_path(&voucher.voucher_number)?;
        let temp = self.write_temp(&path, voucher).await?;

        // Linking fails if the target exists, so only one creator wins.
        let linked = tokio::fs::hard_link(&temp, &path).await;
        if let Err(e) = tokio::fs::remove_file(&temp).await {
            log::warn!("Could not remove temporary record {}: {}", temp.display(), e);
        }
        match linked {
            Ok(()) => {
                log::debug!("Created voucher {} at {}", voucher.voucher_number, path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(voucher.voucher_number.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, voucher: &DisbursementVoucher) -> Result<(), StoreError> {
        let path = self.record_path(&voucher.voucher_number)?;

        // Rename over the target so readers never see half a file.
        let temp = self.write_temp(&path, voucher).await?;
        tokio::fs::rename(&temp, &path).await?;
        log::debug!("Persisted voucher {} to {}", voucher.voucher_number, path.display());
        Ok(())
    }

    async fn load(&self, voucher_number: &str) -> Result<Option<DisbursementVoucher>, StoreError> {
        let path = self.record_path(voucher_number)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, voucher_number: &str) -> Result<bool, StoreError> {
        let path = self.record_path(voucher_number)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<DisbursementVoucher>, StoreError> {
        let mut vouchers = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<DisbursementVoucher>(&bytes) {
                Ok(voucher) => vouchers.push(voucher),
                Err(e) => log::warn!("Skipping unreadable voucher record {}: {}", path.display(), e),
            }
        }
        vouchers.sort_by(|a, b| a.voucher_number.cmp(&b.voucher_number));
        Ok(vouchers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voucher(number: &str) -> DisbursementVoucher {
        DisbursementVoucher {
            voucher_number: number.to_string(),
            payee: "Rosa Villanueva".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVoucherStore::open(dir.path()).await.unwrap();

        store.save(&voucher("DV-001")).await.unwrap();
        let loaded = store.load("DV-001").await.unwrap();
        assert_eq!(loaded, Some(voucher("DV-001")));

        assert!(store.delete("DV-001").await.unwrap());
        assert!(!store.delete("DV-001").await.unwrap());
        assert_eq!(store.load("DV-001").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_slashes_in_number_stay_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVoucherStore::open(dir.path()).await.unwrap();

        store.save(&voucher("../DV/2024/001")).await.unwrap();
        let path = store.record_path("../DV/2024/001").unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(store.load("../DV/2024/001").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_numbers_differing_only_by_reserved_characters_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVoucherStore::open(dir.path()).await.unwrap();

        store.save(&voucher("DV2024001")).await.unwrap();
        assert_eq!(store.load("DV/2024/001").await.unwrap(), None);

        store.save(&voucher("DV/2024/001")).await.unwrap();
        assert_eq!(
            store.load("DV2024001").await.unwrap(),
            Some(voucher("DV2024001"))
        );
        assert_eq!(
            store.load("DV/2024/001").await.unwrap(),
            Some(voucher("DV/2024/001"))
        );
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_refuses_existing_number() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVoucherStore::open(dir.path()).await.unwrap();
        store.create(&voucher("DV-010")).await.unwrap();

        let mut second = voucher("DV-010");
        second.payee = "Someone Else".to_string();
        assert!(matches!(
            store.create(&second).await,
            Err(StoreError::AlreadyExists(number)) if number == "DV-010"
        ));

        assert_eq!(store.load("DV-010").await.unwrap(), Some(voucher("DV-010")));
        // No temporary files are left behind.
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name());
        }
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_have_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(FileVoucherStore::open(dir.path()).await.unwrap());

        let attempts: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let mut candidate = voucher("DV-011");
                    candidate.payee = format!("Payee {i}");
                    store.create(&candidate).await
                })
            })
            .collect();

        let mut created = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(()) => created += 1,
                Err(StoreError::AlreadyExists(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_overlong_number_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVoucherStore::open(dir.path()).await.unwrap();
        let number = "9".repeat(200);
        assert!(matches!(
            store.save(&voucher(&number)).await,
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVoucherStore::open(dir.path()).await.unwrap();
        store.save(&voucher("DV-002")).await.unwrap();
        store.save(&voucher("DV-001")).await.unwrap();
        tokio::fs::write(dir.path().join("broken.json"), b"{ not json")
            .await
            .unwrap();

        let numbers: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.voucher_number)
            .collect();
        assert_eq!(numbers, vec!["DV-001", "DV-002"]);
    }

    #[tokio::test]
    async fn test_blank_number_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVoucherStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.save(&voucher("   ")).await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
