use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Disbursement voucher as submitted by the treasury office.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct DisbursementVoucher {
    #[serde(alias = "voucherNumber", deserialize_with = "lenient_string")]
    pub voucher_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub payee: String,
    #[serde(alias = "payeeAddress", alias = "address", deserialize_with = "lenient_opt_string")]
    pub payee_address: Option<String>,
    #[serde(alias = "taxIdentificationNumber", alias = "tin", deserialize_with = "lenient_opt_string")]
    pub tax_identification_number: Option<String>,
    #[serde(alias = "voucherDate", deserialize_with = "lenient_opt_string")]
    pub voucher_date: Option<String>,
    #[serde(alias = "paymentDate", deserialize_with = "lenient_opt_string")]
    pub payment_date: Option<String>,
    #[serde(alias = "fundSource", deserialize_with = "lenient_string")]
    pub fund_source: String,
    pub particulars: Vec<Particular>,
    pub signatories: Signatories,
    #[serde(alias = "preparedBy")]
    pub prepared_by: Option<Signatory>,
    #[serde(alias = "approvedBy")]
    pub approved_by: Option<Signatory>,
    #[serde(alias = "checkNumber", deserialize_with = "lenient_opt_string")]
    pub check_number: Option<String>,
    #[serde(alias = "bankName", deserialize_with = "lenient_opt_string")]
    pub bank_name: Option<String>,
    #[serde(alias = "officialReceiptNumber", alias = "orNumber", deserialize_with = "lenient_opt_string")]
    pub official_receipt_number: Option<String>,
    #[serde(alias = "accountingEntries")]
    pub accounting_entries: Vec<AccountingEntry>,
}

/// One line item of the payment purpose.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct Particular {
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(alias = "taxRatePercent", alias = "tax_rate", deserialize_with = "lenient_decimal")]
    pub tax_rate_percent: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub amount: Decimal,
}

impl Particular {
    /// Amount withheld for this line, rounded to the centavo.
    pub fn withheld_tax(&self) -> Decimal {
        round_centavos(self.amount.saturating_mul(self.tax_rate_percent) / Decimal::ONE_HUNDRED)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct Signatory {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub position: String,
}

impl Signatory {
    pub fn new(name: &str, position: &str) -> Self {
        Self {
            name: name.to_string(),
            position: position.to_string(),
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// The three certification slots every voucher carries.
///
/// Accepts either a positional array (appropriation, funds availability,
/// validity; extra entries ignored) or an object keyed by slot.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(from = "SignatoriesRepr")]
pub struct Signatories {
    pub appropriation: Option<Signatory>,
    pub funds_availability: Option<Signatory>,
    pub validity: Option<Signatory>,
}

impl Signatories {
    /// Slots in rendering order.
    pub fn slots(&self) -> [Option<&Signatory>; 3] {
        [
            self.appropriation.as_ref(),
            self.funds_availability.as_ref(),
            self.validity.as_ref(),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignatoriesRepr {
    List(Vec<Option<Signatory>>),
    Slots {
        #[serde(default)]
        appropriation: Option<Signatory>,
        #[serde(default, alias = "fundsAvailability")]
        funds_availability: Option<Signatory>,
        #[serde(default)]
        validity: Option<Signatory>,
    },
    Missing,
}

impl From<SignatoriesRepr> for Signatories {
    fn from(repr: SignatoriesRepr) -> Self {
        match repr {
            SignatoriesRepr::List(list) => {
                let mut slots = list.into_iter();
                Signatories {
                    appropriation: slots.next().flatten(),
                    funds_availability: slots.next().flatten(),
                    validity: slots.next().flatten(),
                }
            }
            SignatoriesRepr::Slots {
                appropriation,
                funds_availability,
                validity,
            } => Signatories {
                appropriation,
                funds_availability,
                validity,
            },
            SignatoriesRepr::Missing => Signatories::default(),
        }
    }
}

/// One debit/credit posting line.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct AccountingEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub account: String,
    #[serde(alias = "accountCode", deserialize_with = "lenient_string")]
    pub account_code: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub debit: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub credit: Decimal,
}

/// Derived amounts, never stored.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, ToSchema)]
pub struct VoucherTotals {
    pub total_amount: Decimal,
    pub total_tax: Decimal,
    pub net_amount: Decimal,
}

impl DisbursementVoucher {
    pub fn totals(&self) -> VoucherTotals {
        let mut total_amount = Decimal::ZERO;
        let mut total_tax = Decimal::ZERO;
        for particular in &self.particulars {
            total_amount = total_amount.saturating_add(particular.amount);
            total_tax = total_tax.saturating_add(particular.withheld_tax());
        }
        VoucherTotals {
            total_amount,
            total_tax,
            net_amount: total_amount.saturating_sub(total_tax),
        }
    }
}

/// Round half a centavo away from zero, as printed on the voucher.
pub fn round_centavos(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a numeric field without ever failing.
///
/// Numbers keep their decimal digits exactly; strings are parsed after
/// dropping thousands separators; everything else becomes `0`.
pub fn parse_lenient_number(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::Number(n) => parse_decimal(&n.to_string()),
        serde_json::Value::String(s) => parse_decimal(&s.trim().replace(',', "")),
        _ => Decimal::ZERO,
    }
}

fn parse_decimal(text: &str) -> Decimal {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_lenient_number(&value))
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
