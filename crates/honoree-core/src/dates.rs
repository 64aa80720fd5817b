//! Date cleanup for knowledge-base timestamps and model-reported dates.

use chrono::NaiveDate;

/// Values a language model uses to say "unknown".
const EMPTY_MARKERS: &[&str] = &["", "null", "none", "not found", "unknown", "n/a"];

/// Turn a knowledge-base time value like `+1879-03-14T00:00:00Z` into `1879-03-14`.
pub fn clean_knowledge_time(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('+');
    let date = trimmed.split('T').next().unwrap_or_default().trim();
    if date.is_empty() {
        None
    } else {
        Some(date.to_string())
    }
}

/// Normalize a date to `YYYY-MM-DD`.
///
/// `YYYY` becomes `YYYY-01-01` and `YYYY-MM` becomes `YYYY-MM-01`. Anything
/// that is not a real calendar date in one of those shapes is dropped.
pub fn normalize_date(raw: &str) -> Option<String> {
    let value = raw.trim();
    if is_empty_marker(value) {
        return None;
    }

    let parts: Vec<&str> = value.split('-').collect();
    let all_digits = parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    if !all_digits || parts[0].len() != 4 {
        return None;
    }

    let candidate = match parts.as_slice() {
        [year] => format!("{year}-01-01"),
        [year, month] if month.len() == 2 => format!("{year}-{month}-01"),
        [year, month, day] if month.len() == 2 && day.len() == 2 => {
            format!("{year}-{month}-{day}")
        }
        _ => return None,
    };

    NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
        .ok()
        .map(|_| candidate)
}

/// Whether a model answer means "no value".
pub fn is_empty_marker(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    EMPTY_MARKERS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_time() {
        assert_eq!(clean_knowledge_time("+1879-03-14T00:00:00Z").as_deref(), Some("1879-03-14"));
        assert_eq!(clean_knowledge_time("1955-04-18").as_deref(), Some("1955-04-18"));
        assert_eq!(clean_knowledge_time("  "), None);
    }

    #[test]
    fn test_normalize_date_shapes() {
        assert_eq!(normalize_date("1927-08-04").as_deref(), Some("1927-08-04"));
        assert_eq!(normalize_date("1953").as_deref(), Some("1953-01-01"));
        assert_eq!(normalize_date("1818-02").as_deref(), Some("1818-02-01"));
    }

    #[test]
    fn test_normalize_date_rejects() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("null"), None);
        assert_eq!(normalize_date("Not Found"), None);
        assert_eq!(normalize_date("March 14, 1879"), None);
        assert_eq!(normalize_date("1879-13-01"), None);
        assert_eq!(normalize_date("1879-02-30"), None);
        assert_eq!(normalize_date("79-02-03"), None);
    }
}
