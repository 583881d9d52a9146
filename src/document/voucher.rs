//! Generator for the disbursement voucher PDF.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::layout::VoucherLayoutEngine;
use super::logo::LogoSet;
use super::pdf::write_pdf;
use super::traits::{Generator, Validator};
use super::{GeneratedDocument, GeneratorError};
use crate::voucher::model::DisbursementVoucher;

/// Logos sent along with a render request, as `data:image/jpeg;base64,...`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct LogoOverrides {
    pub left: Option<String>,
    pub right: Option<String>,
}

/// Request to render a voucher.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct VoucherRequest {
    #[serde(flatten)]
    pub voucher: DisbursementVoucher,
    #[serde(default)]
    pub logos: LogoOverrides,
}

impl From<DisbursementVoucher> for VoucherRequest {
    fn from(voucher: DisbursementVoucher) -> Self {
        Self {
            voucher,
            logos: LogoOverrides::default(),
        }
    }
}

impl Validator for DisbursementVoucher {
    fn validate(&self) -> Result<(), String> {
        use super::validation::*;

        let mut errors = ValidationErrors::new();

        validate_required(
            &self.voucher_number,
            "voucher_number",
            "Voucher number",
            &mut errors,
        );
        validate_required(&self.payee, "payee", "Payee", &mut errors);

        for (i, particular) in self.particulars.iter().enumerate() {
            validate_non_negative(
                particular.amount,
                &format!("particulars[{i}].amount"),
                "Amount",
                &mut errors,
            );
            validate_percent(
                particular.tax_rate_percent,
                &format!("particulars[{i}].tax_rate_percent"),
                &mut errors,
            );
        }

        for (i, entry) in self.accounting_entries.iter().enumerate() {
            validate_non_negative(
                entry.debit,
                &format!("accounting_entries[{i}].debit"),
                "Debit",
                &mut errors,
            );
            validate_non_negative(
                entry.credit,
                &format!("accounting_entries[{i}].credit"),
                "Credit",
                &mut errors,
            );
        }

        errors.into_result()
    }
}

impl Validator for VoucherRequest {
    fn validate(&self) -> Result<(), String> {
        self.voucher.validate()
    }
}

/// Download name for a voucher, with the number kept verbatim.
pub fn voucher_filename(voucher_number: &str) -> String {
    format!("disbursement_voucher_{}.pdf", voucher_number)
}

/// Generator for the disbursement voucher.
#[derive(Debug, Clone, Default)]
pub struct VoucherPdfGenerator {
    engine: VoucherLayoutEngine,
    logos: LogoSet,
}

impl VoucherPdfGenerator {
    pub fn new(engine: VoucherLayoutEngine, logos: LogoSet) -> Self {
        Self { engine, logos }
    }

    pub fn engine(&self) -> &VoucherLayoutEngine {
        &self.engine
    }
}

impl Generator<VoucherRequest> for VoucherPdfGenerator {
    fn generate(&self, request: &VoucherRequest) -> Result<GeneratedDocument, GeneratorError> {
        request.validate().map_err(GeneratorError::Invalid)?;

        let rendered = self.engine.render(&request.voucher);
        let logos = self.logos.clone().with_overrides(
            request.logos.left.as_deref(),
            request.logos.right.as_deref(),
        );
        let pdf = write_pdf(&rendered.pages, &logos)?;

        log::debug!(
            "Rendered voucher {} into {} page(s), {} bytes",
            request.voucher.voucher_number,
            rendered.pages.len(),
            pdf.len()
        );

        Ok(GeneratedDocument {
            filename: voucher_filename(&request.voucher.voucher_number),
            pdf,
            page_count: rendered.pages.len(),
            totals: rendered.totals,
        })
    }
}
