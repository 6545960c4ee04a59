//! pt-BR number and currency rendering.

/// Groups an integer digit string with `.` thousands separators.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Renders an amount as Brazilian reais: `1200.5` → `"R$ 1.200,50"`.
pub fn format_brl(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let negative = value < 0.0;
    let total_cents = (value.abs() * 100.0).round() as u64;
    let reais = group_thousands(&(total_cents / 100).to_string());
    let cents = total_cents % 100;
    let sign = if negative && total_cents > 0 { "-" } else { "" };
    format!("{sign}R$ {reais},{cents:02}")
}

/// Renders a plain number the pt-BR way with at most `max_decimals` digits,
/// trimming trailing zeros: `10.5` → `"10,5"`, `1234.0` → `"1.234"`.
pub fn format_decimal_pt(value: f64, max_decimals: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let rendered = format!("{:.*}", max_decimals, value.abs());
    let (int_part, dec_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let dec_part = dec_part.trim_end_matches('0');
    let sign = if value < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    if dec_part.is_empty() {
        format!("{sign}{}", group_thousands(int_part))
    } else {
        format!("{sign}{},{dec_part}", group_thousands(int_part))
    }
}

/// Renders a percentage: `10.5` → `"10,5%"`.
pub fn format_percent(value: f64) -> String {
    let number = format_decimal_pt(value, 3);
    if number.is_empty() {
        return number;
    }
    format!("{number}%")
}

/// Parses a currency amount typed by hand (`"1.200,50"`, `"R$ 300"`, `"1500.5"`).
///
/// A comma is the decimal separator and dots group thousands; without a comma,
/// a single dot followed by one or two digits is read as decimal point.
/// Returns `None` for text with no parseable amount.
pub fn parse_brl_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replacen(',', ".", 1)
    } else if is_dot_decimal(&cleaned) {
        cleaned
    } else {
        cleaned.replace('.', "")
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

fn is_dot_decimal(value: &str) -> bool {
    match value.split_once('.') {
        Some((int_part, dec_part)) => {
            !int_part.is_empty()
                && int_part.chars().all(|c| c.is_ascii_digit())
                && (1..=2).contains(&dec_part.len())
                && dec_part.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Parses a percentage typed by hand (`"10,5%"`, `"20"`).
pub fn parse_percent_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '%')
        .collect();
    cleaned
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::{
        format_brl, format_decimal_pt, format_percent, parse_brl_amount, parse_percent_amount,
    };

    #[test]
    fn brl_groups_thousands_and_pads_cents() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(1200.5), "R$ 1.200,50");
        assert_eq!(format_brl(1_234_567.891), "R$ 1.234.567,89");
        assert_eq!(format_brl(-15.0), "-R$ 15,00");
    }

    #[test]
    fn decimals_trim_trailing_zeros() {
        assert_eq!(format_decimal_pt(10.5, 3), "10,5");
        assert_eq!(format_decimal_pt(1234.0, 2), "1.234");
        assert_eq!(format_percent(12.0), "12%");
    }

    #[test]
    fn brl_amount_reads_both_separator_styles() {
        assert_eq!(parse_brl_amount("1.200,50"), Some(1200.5));
        assert_eq!(parse_brl_amount("R$ 300"), Some(300.0));
        assert_eq!(parse_brl_amount("1500.5"), Some(1500.5));
        assert_eq!(parse_brl_amount("1.500"), Some(1500.0));
        assert_eq!(parse_brl_amount("10.000.000"), Some(10_000_000.0));
        assert_eq!(parse_brl_amount("abc"), None);
        assert_eq!(parse_brl_amount(""), None);
    }

    #[test]
    fn percent_amount_accepts_comma_and_sign() {
        assert_eq!(parse_percent_amount("10,5%"), Some(10.5));
        assert_eq!(parse_percent_amount(" 20 "), Some(20.0));
        assert_eq!(parse_percent_amount("vinte"), None);
    }
}
