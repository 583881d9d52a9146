//! Seams between the HTTP layer and the voucher generator.
//!
//! Handlers only see `Validator` and `Generator<VoucherRequest>`; the
//! disbursement voucher is the implementation behind both
//! (`DisbursementVoucher: Validator`, `VoucherPdfGenerator: Generator`).

use super::{GeneratedDocument, GeneratorError};

/// Boundary checks run before anything is laid out.
pub trait Validator {
    /// Every problem found, as one numbered message.
    fn validate(&self) -> Result<(), String>;
}

/// Turns a request into a finished document.
pub trait Generator<Req> {
    /// Validate, lay out and write the PDF for `request`.
    fn generate(&self, request: &Req) -> Result<GeneratedDocument, GeneratorError>;
}
