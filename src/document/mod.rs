//! Document generation - laying out and writing the disbursement voucher PDF.
//!
//! - `amount_words` - amount in words for the voucher total
//! - `layout` - page layout of the voucher into drawing instructions
//! - `pdf` - drawing instructions to PDF bytes
//! - `voucher` - the voucher generator tying the two together

pub mod amount_words;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod logo;
pub mod page;
pub mod pdf;
pub mod traits;
pub mod validation;
pub mod voucher;

pub use layout::{RenderedVoucher, VoucherLayoutEngine};
pub use logo::{JpegImage, LogoSet};
pub use page::{DrawOp, Page};
pub use traits::{Generator, Validator};
pub use voucher::{LogoOverrides, VoucherPdfGenerator, VoucherRequest};

use thiserror::Error;

use crate::voucher::model::VoucherTotals;

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("voucher failed validation: {0}")]
    Invalid(String),
    #[error("failed to write PDF: {0}")]
    Pdf(String),
}

/// Result of a successful document generation.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub page_count: usize,
    pub totals: VoucherTotals,
}
