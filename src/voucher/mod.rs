pub mod handlers;
pub mod model;
pub mod registry;
pub mod store;

pub use model::{AccountingEntry, DisbursementVoucher, Particular, Signatories, Signatory, VoucherTotals};
pub use registry::VoucherRegistry;
pub use store::{FileVoucherStore, StoreError, VoucherStore};
