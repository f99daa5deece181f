use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// ru-RU digit grouping, the separator is a no-break space.
const GROUP_SEPARATOR: char = '\u{a0}';

#[must_use]
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    let lead = digits.len() % 3;
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (index + 3 - lead) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

#[must_use]
pub fn format_balance(ggp: i64) -> String {
    format!("{} GGP", format_number(ggp))
}

/// `DD.MM.YYYY`. Accepts RFC 3339 and the naive ISO timestamps the server
/// emits; anything else is returned as given.
#[must_use]
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed.format("%d.%m.%Y").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%d.%m.%Y").to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return parsed.format("%d.%m.%Y").to_string();
    }
    raw.to_string()
}

/// `DD.MM.YYYY HH:MM` for transcript timestamps.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed.format("%d.%m.%Y %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%d.%m.%Y %H:%M").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_no_break_space() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_234), "1\u{a0}234");
        assert_eq!(format_number(1_234_567), "1\u{a0}234\u{a0}567");
        assert_eq!(format_number(-45_000), "-45\u{a0}000");
        assert_eq!(format_number(100_000), "100\u{a0}000");
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        assert_eq!(
            format_number(i64::MIN),
            "-9\u{a0}223\u{a0}372\u{a0}036\u{a0}854\u{a0}775\u{a0}808"
        );
    }

    #[test]
    fn formats_dates_from_server_timestamps() {
        assert_eq!(format_date("2024-03-07T18:22:01.123456"), "07.03.2024");
        assert_eq!(format_date("2024-03-07T18:22:01+03:00"), "07.03.2024");
        assert_eq!(format_date("2024-12-31"), "31.12.2024");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn formats_transcript_timestamps() {
        assert_eq!(format_timestamp("2024-03-07T18:22:01"), "07.03.2024 18:22");
        assert_eq!(format_timestamp(""), "");
    }
}
