#![allow(dead_code)]

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use barangay_voucher_server::document::VoucherPdfGenerator;
use barangay_voucher_server::voucher::model::{
    AccountingEntry, DisbursementVoucher, Particular, Signatories, Signatory,
};
use barangay_voucher_server::voucher::{StoreError, VoucherStore};
use barangay_voucher_server::AppState;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;

pub fn particular(description: &str, tax_rate_percent: Decimal, amount: Decimal) -> Particular {
    Particular {
        description: description.to_string(),
        tax_rate_percent,
        amount,
    }
}

pub fn entry(account: &str, code: &str, debit: Decimal, credit: Decimal) -> AccountingEntry {
    AccountingEntry {
        account: account.to_string(),
        account_code: code.to_string(),
        debit,
        credit,
    }
}

/// A filled-in voucher for a single supplier payment.
pub fn sample_voucher(number: &str) -> DisbursementVoucher {
    DisbursementVoucher {
        voucher_number: number.to_string(),
        payee: "Dela Cruz Construction Supply".to_string(),
        payee_address: Some("Purok 3, Barangay San Isidro".to_string()),
        tax_identification_number: Some("123-456-789-000".to_string()),
        voucher_date: Some("2024-03-15".to_string()),
        payment_date: Some("2024-03-20".to_string()),
        fund_source: "General Fund".to_string(),
        particulars: vec![
            particular("Cement and gravel for drainage repair", dec!(1), dec!(12000)),
            particular("Delivery of materials", dec!(0), dec!(500)),
        ],
        signatories: Signatories {
            appropriation: Some(Signatory::new("Maria Santos", "Barangay Treasurer")),
            funds_availability: Some(Signatory::new("Jose Reyes", "Barangay Secretary")),
            validity: Some(Signatory::new("Ana Lim", "Punong Barangay")),
        },
        prepared_by: Some(Signatory::new("Liza Ramos", "Bookkeeper")),
        approved_by: Some(Signatory::new("Ana Lim", "Punong Barangay")),
        check_number: Some("0001234".to_string()),
        bank_name: Some("Land Bank of the Philippines".to_string()),
        official_receipt_number: None,
        accounting_entries: vec![
            entry("Repairs and Maintenance", "5-02-13-040", dec!(12500), dec!(0)),
            entry("Cash in Bank", "1-01-02-010", dec!(0), dec!(12380)),
            entry("Due to BIR", "2-02-01-010", dec!(0), dec!(120)),
        ],
    }
}

/// In-memory store; `fail_writes` makes every create, save and delete fail.
#[derive(Default)]
pub struct MockVoucherStore {
    records: Mutex<HashMap<String, DisbursementVoucher>>,
    fail_writes: bool,
}

impl MockVoucherStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_writes: true,
        }
    }

    pub async fn seed(&self, voucher: DisbursementVoucher) {
        self.records
            .lock()
            .await
            .insert(voucher.voucher_number.clone(), voucher);
    }

    pub async fn stored(&self, number: &str) -> Option<DisbursementVoucher> {
        self.records.lock().await.get(number).cloned()
    }

    fn write_error() -> StoreError {
        StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "store is read-only",
        ))
    }
}

#[async_trait]
impl VoucherStore for MockVoucherStore {
    async fn create(&self, voucher: &DisbursementVoucher) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(Self::write_error());
        }
        match self.records.lock().await.entry(voucher.voucher_number.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(voucher.voucher_number.clone())),
            Entry::Vacant(slot) => {
                slot.insert(voucher.clone());
                Ok(())
            }
        }
    }

    async fn save(&self, voucher: &DisbursementVoucher) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(Self::write_error());
        }
        self.seed(voucher.clone()).await;
        Ok(())
    }

    async fn load(&self, voucher_number: &str) -> Result<Option<DisbursementVoucher>, StoreError> {
        Ok(self.stored(voucher_number).await)
    }

    async fn delete(&self, voucher_number: &str) -> Result<bool, StoreError> {
        if self.fail_writes {
            return Err(Self::write_error());
        }
        Ok(self.records.lock().await.remove(voucher_number).is_some())
    }

    async fn list(&self) -> Result<Vec<DisbursementVoucher>, StoreError> {
        let mut vouchers: Vec<_> = self.records.lock().await.values().cloned().collect();
        vouchers.sort_by(|a, b| a.voucher_number.cmp(&b.voucher_number));
        Ok(vouchers)
    }
}

pub fn test_state(store: Arc<dyn VoucherStore>) -> AppState {
    AppState::new(
        VoucherPdfGenerator::default(),
        store,
        Duration::from_secs(60),
    )
    .expect("Failed to create AppState")
}
