//! Field normalization for visit-log text.
//!
//! Every function here is total: malformed input degrades to an empty string
//! or a zero timestamp, it never fails.
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// `D/M/YYYY`, optionally followed by a time component (`12/3/2023 10:45:00`).
static LOCAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{1,4})(?:\s|$)").expect("static date pattern")
});

/// Removes combining diacritical marks (`"Peña"` -> `"Pena"`).
pub fn strip_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Name form used for fuzzy comparison: accents stripped, uppercased,
/// whitespace squeezed. Punctuation is kept.
pub fn normalize_name(s: &str) -> String {
    strip_accents(s.trim())
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strict form for plates and serial numbers: uppercase ASCII letters and
/// digits only.
pub fn normalize_alnum(s: &str) -> String {
    strip_accents(s.trim())
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Lowercases each whitespace-delimited token and uppercases its first
/// letter. Operates on chars, so `"ÁNGEL PEÑA"` becomes `"Ángel Peña"`.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accent-free lowercase form used by the search layer.
pub fn fold_for_search(s: &str) -> String {
    strip_accents(s)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a `D/M/YYYY` visit date into epoch milliseconds (midnight UTC).
///
/// Returns `0` for anything unparsable: missing dates, impossible calendar
/// days, and dates before 1970. Zero doubles as the "unknown" timestamp, so
/// such rows lose every recency comparison but are still ingested.
pub fn parse_local_date(s: &str) -> i64 {
    let Some(caps) = LOCAL_DATE.captures(s.trim()) else {
        return 0;
    };

    let day = caps[1].parse::<u32>().ok();
    let month = caps[2].parse::<u32>().ok();
    let year = caps[3].parse::<i32>().ok();

    let (Some(day), Some(month), Some(year)) = (day, month, year) else {
        return 0;
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        // pre-1970 (usually a truncated year) is treated as unknown, not flagged
        .filter(|ts| *ts > 0)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("José Peña Álvarez"), "Jose Pena Alvarez");
        assert_eq!(strip_accents("plain"), "plain");
    }

    #[test]
    fn test_normalize_name_squeezes_whitespace() {
        assert_eq!(normalize_name("  marco   antonio\tlugo "), "MARCO ANTONIO LUGO");
        assert_eq!(normalize_name("Ángela Núñez"), "ANGELA NUNEZ");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_normalize_alnum_plates_and_serials() {
        assert_eq!(normalize_alnum(" abc-12-3 "), "ABC123");
        assert_eq!(normalize_alnum("3n1-ab7ap.5ky"), "3N1AB7AP5KY");
        assert_eq!(normalize_alnum("ñ-1"), "N1");
        assert_eq!(normalize_alnum("---"), "");
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("(55) 1234-5678"), "5512345678");
        assert_eq!(digits_only("sin teléfono"), "");
    }

    #[test]
    fn test_title_case_unicode() {
        assert_eq!(title_case("ÁNGEL PEÑA"), "Ángel Peña");
        assert_eq!(title_case("juan  perez"), "Juan Perez");
        assert_eq!(title_case("élodie"), "Élodie");
        assert_eq!(title_case("   "), "");
    }

    #[test]
    fn test_fold_for_search() {
        assert_eq!(fold_for_search("  ANA  Ruíz "), "ana ruiz");
    }

    #[test]
    fn test_parse_local_date_orders_days() {
        let earlier = parse_local_date("9/3/2023");
        let later = parse_local_date("10/03/2023");
        assert!(earlier > 0);
        assert!(later > earlier);
        assert_eq!(later - earlier, 86_400_000);
    }

    #[test]
    fn test_parse_local_date_is_day_month_year() {
        // 1 February, not 2 January
        let feb_first = parse_local_date("1/2/2024");
        let jan_thirty_first = parse_local_date("31/1/2024");
        assert!(feb_first > jan_thirty_first);
    }

    #[test]
    fn test_parse_local_date_accepts_trailing_time() {
        assert_eq!(
            parse_local_date("12/3/2023 10:45:00"),
            parse_local_date("12/3/2023")
        );
    }

    #[test]
    fn test_parse_local_date_failures_are_zero() {
        assert_eq!(parse_local_date(""), 0);
        assert_eq!(parse_local_date("ayer"), 0);
        assert_eq!(parse_local_date("2023-03-12"), 0);
        assert_eq!(parse_local_date("31/2/2023"), 0);
        assert_eq!(parse_local_date("1/13/2023"), 0);
        // pre-epoch years, e.g. a mistyped "2" for "2023"
        assert_eq!(parse_local_date("5/6/2"), 0);
    }
}
