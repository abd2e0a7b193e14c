use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)").expect("static regex"));

/// Arithmetic mean; 0.0 for an empty slice.
pub(crate) fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// "148 min" → 148. Anything without a leading number ("N/A") is 0.
pub(crate) fn parse_runtime_minutes(s: &str) -> u32 {
    LEADING_INT
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

pub(crate) fn parse_rating(s: &str) -> f32 {
    s.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// OMDb dates look like "16 Jul 2010".
pub(crate) fn parse_released(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d %b %Y").ok()
}

/// OMDb uses "N/A" for titles without artwork.
pub(crate) fn usable_url(u: &str) -> Option<&str> {
    let u = u.trim();
    if u.is_empty() || u.eq_ignore_ascii_case("n/a") {
        return None;
    }
    if u.starts_with("http://") || u.starts_with("https://") {
        Some(u)
    } else {
        None
    }
}

/// Show "—" instead of empty strings and "N/A".
pub(crate) fn or_dash(s: &str) -> &str {
    let t = s.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("n/a") {
        "—"
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages() {
        assert_eq!(average(&[10.0, 9.0]), 9.5);
        assert_eq!(average(&[148.0, 116.0]), 132.0);
        assert_eq!(average(&[]), 0.0);
    }

    #[test]
    fn runtime_parsing() {
        assert_eq!(parse_runtime_minutes("148 min"), 148);
        assert_eq!(parse_runtime_minutes("90"), 90);
        assert_eq!(parse_runtime_minutes("N/A"), 0);
        assert_eq!(parse_runtime_minutes(""), 0);
    }

    #[test]
    fn rating_parsing() {
        assert_eq!(parse_rating("7.5"), 7.5);
        assert_eq!(parse_rating("N/A"), 0.0);
        assert_eq!(parse_rating("NaN"), 0.0);
    }

    #[test]
    fn released_parsing() {
        assert_eq!(
            parse_released("03 Jul 1985"),
            NaiveDate::from_ymd_opt(1985, 7, 3)
        );
        assert_eq!(parse_released("N/A"), None);
    }

    #[test]
    fn url_filter() {
        assert_eq!(usable_url("N/A"), None);
        assert_eq!(usable_url(" "), None);
        assert_eq!(usable_url("file:///etc/passwd"), None);
        assert_eq!(usable_url("https://x/y.jpg"), Some("https://x/y.jpg"));
    }
}
