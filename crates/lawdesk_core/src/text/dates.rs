//! Calendar date conversions between storage (ISO) and display (pt-BR) forms.

use chrono::{DateTime, Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static DISPLAY_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid display date regex"));
static ISO_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("valid iso prefix regex"));

const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Storage format for calendar dates.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an ISO `YYYY-MM-DD` date, ignoring any time suffix.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let caps = ISO_PREFIX_RE.captures(value.trim())?;
    NaiveDate::parse_from_str(&format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]), ISO_DATE_FORMAT)
        .ok()
}

/// Renders stored dates for display.
///
/// - `DD/MM/YYYY` input is returned unchanged.
/// - `YYYY-MM-DD[...]` input is split without timezone math.
/// - RFC 3339 timestamps use their UTC calendar day.
/// - Anything else is returned as-is.
pub fn format_date_to_display(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if DISPLAY_DATE_RE.is_match(trimmed) {
        return trimmed.to_string();
    }
    if let Some(caps) = ISO_PREFIX_RE.captures(trimmed) {
        return format!("{}/{}/{}", &caps[3], &caps[2], &caps[1]);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed.naive_utc().date().format("%d/%m/%Y").to_string();
    }
    trimmed.to_string()
}

/// Converts a display date (`DD/MM/YYYY`) to storage form.
///
/// Already-ISO input passes through; anything else yields `None`.
pub fn format_date_to_iso(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if DISPLAY_DATE_RE.is_match(trimmed) {
        let date = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()?;
        return Some(date.format(ISO_DATE_FORMAT).to_string());
    }
    parse_iso_date(trimmed)
        .filter(|_| trimmed.len() == 10)
        .map(|date| date.format(ISO_DATE_FORMAT).to_string())
}

/// Whole days between two dates, in either order.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs()
}

/// Human duration label: `"Mesmo dia"` or `"N dias"`.
pub fn duration_label(start: NaiveDate, end: NaiveDate) -> String {
    match days_between(start, end) {
        0 => "Mesmo dia".to_string(),
        1 => "1 dia".to_string(),
        days => format!("{days} dias"),
    }
}

/// Age in completed years at `on`. Returns `None` when `on` precedes birth.
pub fn age_on(birthday: NaiveDate, on: NaiveDate) -> Option<u32> {
    if on < birthday {
        return None;
    }
    let mut years = on.year() - birthday.year();
    if (on.month(), on.day()) < (birthday.month(), birthday.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Long Portuguese date: `15 de outubro de 2026`.
pub fn long_date_pt(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS_PT[date.month0() as usize],
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn display_and_iso_conversions() {
        assert_eq!(format_date_to_display("2024-01-31"), "31/01/2024");
        assert_eq!(format_date_to_display("2024-01-31T10:00:00Z"), "31/01/2024");
        assert_eq!(format_date_to_display("31/01/2024"), "31/01/2024");
        assert_eq!(format_date_to_display(""), "");
        assert_eq!(format_date_to_iso("31/01/2024").as_deref(), Some("2024-01-31"));
        assert_eq!(format_date_to_iso("2024-01-31").as_deref(), Some("2024-01-31"));
        assert_eq!(format_date_to_iso("31/02/2024"), None);
        assert_eq!(format_date_to_iso("tomorrow"), None);
    }

    #[test]
    fn durations_and_age() {
        assert_eq!(duration_label(date(2024, 1, 1), date(2024, 1, 1)), "Mesmo dia");
        assert_eq!(duration_label(date(2024, 1, 10), date(2024, 1, 1)), "9 dias");
        assert_eq!(age_on(date(1990, 10, 16), date(2026, 10, 15)), Some(35));
        assert_eq!(age_on(date(1990, 10, 15), date(2026, 10, 15)), Some(36));
        assert_eq!(age_on(date(2030, 1, 1), date(2026, 1, 1)), None);
    }

    #[test]
    fn long_date_uses_portuguese_month() {
        assert_eq!(long_date_pt(date(2026, 10, 15)), "15 de outubro de 2026");
    }
}
