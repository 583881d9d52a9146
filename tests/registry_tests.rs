//! Voucher registry: cache in front of a store, rolled back on failed writes.

mod common;

use std::sync::Arc;

use barangay_voucher_server::cache::MutationOutcome;
use barangay_voucher_server::voucher::{FileVoucherStore, StoreError, VoucherRegistry};
use common::{sample_voucher, MockVoucherStore};

#[tokio::test]
async fn test_save_then_get_reads_back() {
    // Arrange
    let store = Arc::new(MockVoucherStore::new());
    let registry = VoucherRegistry::new(store.clone());

    // Act
    let outcome = registry.save(sample_voucher("DV-100")).await;

    // Assert
    assert!(outcome.is_committed());
    assert_eq!(
        registry.get("DV-100").await.unwrap(),
        Some(sample_voucher("DV-100"))
    );
    assert!(store.stored("DV-100").await.is_some());
}

#[tokio::test]
async fn test_failed_save_rolls_cache_back() {
    // Arrange: the store already holds the original, but refuses writes.
    let store = Arc::new(MockVoucherStore::failing());
    store.seed(sample_voucher("DV-101")).await;
    let registry = VoucherRegistry::new(store.clone());
    let original = registry.get("DV-101").await.unwrap();

    let mut edited = sample_voucher("DV-101");
    edited.payee = "Someone Else".to_string();

    // Act
    let outcome = registry.save(edited).await;

    // Assert
    match outcome {
        MutationOutcome::RolledBack { restored, reason } => {
            assert_eq!(restored, original);
            assert!(reason.contains("read-only"));
        }
        MutationOutcome::Committed(_) => panic!("save should not commit"),
    }
    let cached = registry.get("DV-101").await.unwrap().unwrap();
    assert_eq!(cached.payee, "Dela Cruz Construction Supply");
}

#[tokio::test]
async fn test_failed_first_save_leaves_nothing_behind() {
    let registry = VoucherRegistry::new(Arc::new(MockVoucherStore::failing()));

    let outcome = registry.save(sample_voucher("DV-102")).await;

    assert!(!outcome.is_committed());
    assert_eq!(registry.get("DV-102").await.unwrap(), None);
}

#[tokio::test]
async fn test_failed_delete_restores_entry() {
    let store = Arc::new(MockVoucherStore::failing());
    store.seed(sample_voucher("DV-103")).await;
    let registry = VoucherRegistry::new(store.clone());
    assert!(registry.exists("DV-103").await.unwrap());

    let outcome = registry.delete("DV-103").await;

    assert!(!outcome.is_committed());
    assert!(registry.exists("DV-103").await.unwrap());
}

#[tokio::test]
async fn test_delete_removes_from_cache_and_store() {
    let store = Arc::new(MockVoucherStore::new());
    let registry = VoucherRegistry::new(store.clone());
    registry.save(sample_voucher("DV-104")).await;

    let outcome = registry.delete("DV-104").await;

    assert_eq!(outcome, MutationOutcome::Committed(None));
    assert_eq!(registry.get("DV-104").await.unwrap(), None);
    assert!(store.stored("DV-104").await.is_none());
}

#[tokio::test]
async fn test_file_store_survives_new_registry() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileVoucherStore::open(dir.path()).await.unwrap());
    VoucherRegistry::new(store)
        .save(sample_voucher("DV/2024/105"))
        .await;

    // Act: a fresh registry has a cold cache and must read the file.
    let reopened = Arc::new(FileVoucherStore::open(dir.path()).await.unwrap());
    let registry = VoucherRegistry::new(reopened);

    // Assert
    let loaded = registry.get("DV/2024/105").await.unwrap();
    assert_eq!(loaded, Some(sample_voucher("DV/2024/105")));
    assert_eq!(registry.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_on_taken_number_keeps_cached_original() {
    // Arrange
    let store = Arc::new(MockVoucherStore::new());
    let registry = VoucherRegistry::new(store.clone());
    registry.create(sample_voucher("DV-106")).await.unwrap();

    let mut duplicate = sample_voucher("DV-106");
    duplicate.payee = "Someone Else".to_string();

    // Act
    let result = registry.create(duplicate).await;

    // Assert
    assert!(matches!(result, Err(StoreError::AlreadyExists(ref n)) if n == "DV-106"));
    assert_eq!(
        registry.get("DV-106").await.unwrap(),
        Some(sample_voucher("DV-106"))
    );
    assert_eq!(
        store.stored("DV-106").await.unwrap().payee,
        "Dela Cruz Construction Supply"
    );
}

#[tokio::test]
async fn test_concurrent_creates_commit_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileVoucherStore::open(dir.path()).await.unwrap());
    let registry = VoucherRegistry::new(store);

    let mut first = sample_voucher("DV/2024/107");
    first.payee = "First Supplier".to_string();
    let mut second = sample_voucher("DV/2024/107");
    second.payee = "Second Supplier".to_string();

    let (a, b) = tokio::join!(registry.create(first), registry.create(second));

    let committed = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Ok(outcome) if outcome.is_committed()))
        .count();
    let conflicts = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(StoreError::AlreadyExists(_))))
        .count();
    assert_eq!((committed, conflicts), (1, 1));

    // The cache agrees with the record that won on disk.
    let reopened = Arc::new(FileVoucherStore::open(dir.path()).await.unwrap());
    let on_disk = VoucherRegistry::new(reopened)
        .get("DV/2024/107")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(registry.get("DV/2024/107").await.unwrap(), Some(on_disk));
}

#[tokio::test]
async fn test_failed_create_leaves_nothing_behind() {
    let registry = VoucherRegistry::new(Arc::new(MockVoucherStore::failing()));

    let outcome = registry.create(sample_voucher("DV-108")).await.unwrap();

    assert!(!outcome.is_committed());
    assert_eq!(registry.get("DV-108").await.unwrap(), None);
}
