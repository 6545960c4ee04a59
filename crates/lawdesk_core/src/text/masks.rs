//! Input masks for Brazilian document numbers, dates and money.
//!
//! Masks are progressive: they format however many digits have been typed so
//! far, drop everything that is not an ASCII digit, and truncate at the
//! document's digit count. Applying a mask to its own output is a no-op.

use crate::text::money::format_brl;
use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w\S*").expect("valid word regex"));
static CURRENCY_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[R$\s.]").expect("valid currency noise regex"));

const TITLE_ACRONYMS: &[&str] = &[
    "clt", "pj", "oab", "rg", "cpf", "cnpj", "uf", "ti", "rh", "ceo", "cfo", "mei", "pis",
    "pasep", "ctps", "cnh", "oab/uf",
];
const TITLE_LOWERCASE: &[&str] = &["da", "de", "do", "das", "dos", "e", "em", "para", "com"];

/// Keeps only ASCII digits.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Lays digits into consecutive groups, writing each group's separator only
/// once that group has started.
fn layout(digits: &str, groups: &[(&str, usize)]) -> String {
    let mut out = String::with_capacity(digits.len() + groups.len() * 2);
    let mut rest = digits;
    for &(separator, size) in groups {
        if rest.is_empty() {
            break;
        }
        let take = size.min(rest.len());
        out.push_str(separator);
        out.push_str(&rest[..take]);
        rest = &rest[take..];
    }
    out
}

/// `DD/MM/YYYY`.
pub fn mask_date(value: &str) -> String {
    layout(&digits_only(value), &[("", 2), ("/", 2), ("/", 4)])
}

/// `XXX.XXX.XXX-XX`, truncated at 11 digits.
pub fn mask_cpf(value: &str) -> String {
    layout(
        &digits_only(value),
        &[("", 3), (".", 3), (".", 3), ("-", 2)],
    )
}

/// `XX.XXX.XXX/XXXX-XX`, truncated at 14 digits.
pub fn mask_cnpj(value: &str) -> String {
    layout(
        &digits_only(value),
        &[("", 2), (".", 3), (".", 3), ("/", 4), ("-", 2)],
    )
}

/// CPF layout up to 11 digits, CNPJ layout beyond.
pub fn mask_cpf_or_cnpj(value: &str) -> String {
    if digits_only(value).len() <= 11 {
        mask_cpf(value)
    } else {
        mask_cnpj(value)
    }
}

/// `XXXXX-XXX`.
pub fn mask_cep(value: &str) -> String {
    layout(&digits_only(value), &[("", 5), ("-", 3)])
}

/// `(XX) XXXX-XXXX` for landlines, `(XX) XXXXX-XXXX` for 11-digit mobiles.
pub fn mask_phone(value: &str) -> String {
    let digits = digits_only(value);
    if digits.len() <= 2 {
        return digits;
    }
    let local = if digits.len() > 10 { 5 } else { 4 };
    let mut out = format!("({}) ", &digits[..2]);
    out.push_str(&layout(&digits[2..], &[("", local), ("-", 4)]));
    out
}

/// CNJ unified process number: `NNNNNNN-DD.AAAA.J.TR.OOOO`.
pub fn mask_cnj(value: &str) -> String {
    layout(
        &digits_only(value),
        &[("", 7), ("-", 2), (".", 4), (".", 1), (".", 2), (".", 4)],
    )
}

/// Internal fee-agreement number: `NNNNNNN/NNN`.
pub fn mask_hon(value: &str) -> String {
    layout(&digits_only(value), &[("", 7), ("/", 3)])
}

/// `NNNNNNNN-N`.
pub fn mask_rg(value: &str) -> String {
    layout(&digits_only(value), &[("", 8), ("-", 1)])
}

/// Treats typed digits as cents: `"123456"` → `"R$ 1.234,56"`.
///
/// Returns an empty string when no digits were typed.
pub fn mask_money(value: &str) -> String {
    let digits = digits_only(value);
    if digits.is_empty() {
        return String::new();
    }
    let trimmed = digits.trim_start_matches('0');
    let cents = if trimmed.len() > 17 {
        u64::MAX
    } else {
        trimmed.parse::<u64>().unwrap_or(0)
    };
    format_brl(cents as f64 / 100.0)
}

/// Parses a pt-BR currency string (`"R$ 1.234,56"`) into a number.
///
/// Malformed input parses as `0.0`.
pub fn parse_currency(value: &str) -> f64 {
    let cleaned = CURRENCY_NOISE_RE.replace_all(value, "").replacen(',', ".", 1);
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Title-cases names and labels, keeping known acronyms upper-case and
/// Portuguese connectors lower-case.
pub fn to_title_case(value: &str) -> String {
    WORD_RE
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let word = &caps[0];
            let lower = word.to_lowercase();
            if TITLE_ACRONYMS.contains(&lower.as_str()) {
                return lower.to_uppercase();
            }
            if TITLE_LOWERCASE.contains(&lower.as_str()) {
                return lower;
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .into_owned()
}
