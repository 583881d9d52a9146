//! Spell peso amounts in English words for the "Amount in Words" line.

use rust_decimal::Decimal;

use super::format::centavos;

const ONES: [&str; 20] = [
    "",
    "ONE",
    "TWO",
    "THREE",
    "FOUR",
    "FIVE",
    "SIX",
    "SEVEN",
    "EIGHT",
    "NINE",
    "TEN",
    "ELEVEN",
    "TWELVE",
    "THIRTEEN",
    "FOURTEEN",
    "FIFTEEN",
    "SIXTEEN",
    "SEVENTEEN",
    "EIGHTEEN",
    "NINETEEN",
];

const TENS: [&str; 10] = [
    "", "", "TWENTY", "THIRTY", "FORTY", "FIFTY", "SIXTY", "SEVENTY", "EIGHTY", "NINETY",
];

/// Scale words by group index, least significant group first.
const SCALES: [&str; 4] = ["", "THOUSAND", "MILLION", "BILLION"];

/// Convert a non-negative amount into uppercase English words.
///
/// Whole amounts end in `ONLY.`; centavos are appended as two digits,
/// e.g. `1250.5` spells `ONE THOUSAND TWO HUNDRED FIFTY & 50 ONLY.`.
/// An amount of zero spells `ZERO`.
pub fn spell(amount: Decimal) -> String {
    let cents = to_cents(amount);
    if cents == 0 {
        return "ZERO".to_string();
    }

    let pesos = cents / 100;
    let centavos = cents % 100;
    let pesos_words = if pesos == 0 {
        "ZERO".to_string()
    } else {
        spell_integer(pesos)
    };

    if centavos == 0 {
        format!("{pesos_words} ONLY.")
    } else {
        format!("{pesos_words} & {centavos:02} ONLY.")
    }
}

/// Round to whole centavos. Negative input counts as zero.
fn to_cents(amount: Decimal) -> u128 {
    if amount <= Decimal::ZERO {
        return 0;
    }
    centavos(amount)
}

fn spell_integer(value: u128) -> String {
    let mut groups: Vec<String> = Vec::new();
    let mut remaining = value;
    let mut index = 0;

    while remaining > 0 {
        // The largest scale absorbs everything above it.
        if index == SCALES.len() - 1 {
            groups.push(format!("{} {}", spell_integer(remaining), SCALES[index]));
            break;
        }

        let group = (remaining % 1000) as usize;
        if group > 0 {
            let words = spell_group(group);
            if SCALES[index].is_empty() {
                groups.push(words);
            } else {
                groups.push(format!("{} {}", words, SCALES[index]));
            }
        }
        remaining /= 1000;
        index += 1;
    }

    groups.reverse();
    groups.join(" ")
}

/// Spell a value in `1..1000`.
fn spell_group(value: usize) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let hundreds = value / 100;
    let rest = value % 100;

    if hundreds > 0 {
        parts.push(ONES[hundreds]);
        parts.push("HUNDRED");
    }
    if rest >= 20 {
        parts.push(TENS[rest / 10]);
        if rest % 10 > 0 {
            parts.push(ONES[rest % 10]);
        }
    } else if rest > 0 {
        parts.push(ONES[rest]);
    }

    parts.join(" ")
}
