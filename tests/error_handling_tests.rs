#[cfg(test)]
mod error_handling_tests {
    use barangay_voucher_server::document::{Generator, GeneratorError, VoucherPdfGenerator, VoucherRequest};
    use barangay_voucher_server::voucher::model::DisbursementVoucher;
    use barangay_voucher_server::ErrorResponse;
    use rust_decimal::Decimal;

    #[test]
    fn test_error_response_kinds() {
        assert_eq!(ErrorResponse::bad_request("x").error, "BadRequest");
        assert_eq!(ErrorResponse::not_found("x").error, "NotFound");
        assert_eq!(ErrorResponse::internal_error("x").error, "InternalServerError");
    }

    #[test]
    fn test_error_response_serializes_timestamp() {
        let error = ErrorResponse::not_found("Voucher 'DV-1' not found");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["message"], "Voucher 'DV-1' not found");
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_malformed_json_is_rejected_before_rendering() {
        let result: Result<VoucherRequest, _> = serde_json::from_str("{ \"payee\": ");
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_numbers_become_zero() {
        let voucher: DisbursementVoucher = serde_json::from_str(
            r#"{
                "voucherNumber": "DV-77",
                "payee": "Pedro Garcia",
                "particulars": [{ "description": "Snacks", "amount": "abc", "taxRatePercent": null }],
                "accountingEntries": [{ "account": "Cash", "debit": {}, "credit": [] }]
            }"#,
        )
        .unwrap();

        assert_eq!(voucher.particulars[0].amount, Decimal::ZERO);
        assert_eq!(voucher.particulars[0].tax_rate_percent, Decimal::ZERO);
        assert_eq!(voucher.accounting_entries[0].debit, Decimal::ZERO);
        assert_eq!(voucher.totals().net_amount, Decimal::ZERO);
    }

    #[test]
    fn test_validation_lists_every_problem() {
        let voucher: DisbursementVoucher = serde_json::from_str(
            r#"{
                "particulars": [{ "description": "Refund", "amount": -50 }],
                "accountingEntries": [{ "account": "Cash", "credit": -50 }]
            }"#,
        )
        .unwrap();

        match VoucherPdfGenerator::default().generate(&VoucherRequest::from(voucher)) {
            Err(GeneratorError::Invalid(message)) => {
                assert!(message.starts_with("Validation failed: 4 error(s) found"));
                assert!(message.contains("[voucher_number]"));
                assert!(message.contains("[payee]"));
                assert!(message.contains("[particulars[0].amount]"));
                assert!(message.contains("[accounting_entries[0].credit]"));
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("negative amounts must be rejected"),
        }
    }
}
