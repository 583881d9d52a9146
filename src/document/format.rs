//! Number and text formatting shared by the voucher layout.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::voucher::model::round_centavos;

/// Format a peso amount with thousands separators and two decimals,
/// e.g. `1234567.5` becomes `1,234,567.50`.
pub fn format_currency(amount: Decimal) -> String {
    let cents = centavos(amount.abs());
    let whole = group_thousands(cents / 100);
    let sign = if amount.is_sign_negative() && cents > 0 { "-" } else { "" };
    format!("{sign}{whole}.{:02}", cents % 100)
}

/// Whole centavos of a non-negative amount, rounded half away from zero.
pub(crate) fn centavos(amount: Decimal) -> u128 {
    let rounded = round_centavos(amount);
    let pesos = rounded.trunc().to_u128().unwrap_or(0);
    let fraction = (rounded.fract() * Decimal::ONE_HUNDRED).to_u128().unwrap_or(0);
    pesos * 100 + fraction
}

/// Format a rate as a whole percentage, e.g. `12.0` becomes `12%`.
pub fn format_percent(rate: Decimal) -> String {
    let whole = rate
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0);
    format!("{whole}%")
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Greedy word wrap on a character budget.
///
/// Words longer than a whole line are split. Always returns at least one
/// line, which is empty for blank input.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
