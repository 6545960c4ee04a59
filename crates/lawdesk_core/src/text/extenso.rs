//! Brazilian-Portuguese number-to-words conversion.
//!
//! # Responsibility
//! - Spell integer quantities by thousands groups.
//! - Spell currency amounts (reais/centavos) and percentages.
//!
//! # Invariants
//! - Output is deterministic and never panics.
//! - Non-finite or negative input yields an empty string.
//! - `1000` is spelled `mil`, never `um mil`; `100` is spelled `cem`.

const UNITS: [&str; 10] = [
    "", "um", "dois", "três", "quatro", "cinco", "seis", "sete", "oito", "nove",
];
const TENS: [&str; 10] = [
    "",
    "dez",
    "vinte",
    "trinta",
    "quarenta",
    "cinquenta",
    "sessenta",
    "setenta",
    "oitenta",
    "noventa",
];
const TEENS: [&str; 10] = [
    "dez",
    "onze",
    "doze",
    "treze",
    "quatorze",
    "quinze",
    "dezesseis",
    "dezessete",
    "dezoito",
    "dezenove",
];
const HUNDREDS: [&str; 10] = [
    "",
    "cento",
    "duzentos",
    "trezentos",
    "quatrocentos",
    "quinhentos",
    "seiscentos",
    "setecentos",
    "oitocentos",
    "novecentos",
];
const SCALE_SINGULAR: [&str; 5] = ["", "mil", "milhão", "bilhão", "trilhão"];
const SCALE_PLURAL: [&str; 5] = ["", "mil", "milhões", "bilhões", "trilhões"];

/// Largest integer part the scale table can spell (999 trilhões ...).
pub const MAX_SPELLABLE: u64 = 999_999_999_999_999;

/// Spells one group in `0..=999`.
fn spell_group(group: u64) -> String {
    if group == 100 {
        return "cem".to_string();
    }

    let hundreds = (group / 100) as usize;
    let tens = ((group % 100) / 10) as usize;
    let units = (group % 10) as usize;
    let mut out = String::new();

    if hundreds > 0 {
        out.push_str(HUNDREDS[hundreds]);
        if tens > 0 || units > 0 {
            out.push_str(" e ");
        }
    }

    if tens == 1 {
        out.push_str(TEENS[units]);
    } else {
        if tens > 0 {
            out.push_str(TENS[tens]);
            if units > 0 {
                out.push_str(" e ");
            }
        }
        if units > 0 {
            out.push_str(UNITS[units]);
        }
    }

    out
}

/// Spells a non-negative integer in Portuguese words.
///
/// Values above [`MAX_SPELLABLE`] are spelled as digits, since the scale table
/// stops at trilhões.
pub fn number_in_words(value: u64) -> String {
    if value == 0 {
        return "zero".to_string();
    }
    if value > MAX_SPELLABLE {
        return value.to_string();
    }

    let mut groups = Vec::new();
    let mut rest = value;
    while rest > 0 {
        groups.push(rest % 1000);
        rest /= 1000;
    }

    let mut out = String::new();
    for (index, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }

        if !out.is_empty() {
            if index == 0 && (group < 100 || group % 100 == 0) {
                out.push_str(" e ");
            } else {
                out.push_str(", ");
            }
        }

        if group == 1 && index == 1 {
            out.push_str(SCALE_SINGULAR[1]);
            continue;
        }

        out.push_str(&spell_group(group));
        if index > 0 {
            out.push(' ');
            out.push_str(if group > 1 {
                SCALE_PLURAL[index]
            } else {
                SCALE_SINGULAR[index]
            });
        }
    }

    out
}

/// Spells a currency amount in reais and centavos.
///
/// Cents are rounded to two decimal places.
pub fn currency_in_words(value: f64) -> String {
    if !value.is_finite() || value < 0.0 {
        return String::new();
    }

    let total_cents = (value * 100.0).round();
    if total_cents == 0.0 {
        return "zero reais".to_string();
    }
    if total_cents / 100.0 > MAX_SPELLABLE as f64 {
        return String::new();
    }

    let total_cents = total_cents as u64;
    let reais = total_cents / 100;
    let cents = total_cents % 100;
    let mut out = String::new();

    if reais > 0 {
        out.push_str(&number_in_words(reais));
        out.push_str(if reais == 1 { " real" } else { " reais" });
    }

    if cents > 0 {
        if reais > 0 {
            out.push_str(" e ");
        }
        out.push_str(&number_in_words(cents));
        out.push_str(if cents == 1 { " centavo" } else { " centavos" });
    }

    out
}

/// Spells a percentage, reading decimals as a whole number after `vírgula`.
///
/// Leading zeros of the decimal part are read one by one (`2,05` reads
/// `dois vírgula zero cinco`) so the spoken value stays unambiguous.
pub fn percent_in_words(value: f64) -> String {
    if !value.is_finite() || value < 0.0 {
        return String::new();
    }

    let rendered = value.to_string();
    let (int_part, dec_part) = match rendered.split_once('.') {
        Some((int_part, dec_part)) => (int_part, Some(dec_part)),
        None => (rendered.as_str(), None),
    };

    let Ok(integer) = int_part.parse::<u64>() else {
        return String::new();
    };
    let mut out = number_in_words(integer);

    if let Some(decimals) = dec_part.filter(|d| !d.is_empty()) {
        out.push_str(" vírgula ");
        let significant = decimals.trim_start_matches('0');
        let leading_zeros = decimals.len() - significant.len();
        let mut words: Vec<String> = vec!["zero".to_string(); leading_zeros];
        if let Ok(rest) = significant.parse::<u64>() {
            words.push(number_in_words(rest));
        }
        out.push_str(&words.join(" "));
    }

    out.push_str(" por cento");
    out
}
