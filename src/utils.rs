use once_cell::sync::Lazy;
use regex::Regex;

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"20[0-9]{2}").unwrap());
static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap());
static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([0-9]{3})\b").unwrap());

const NAME_SEPARATORS: [char; 4] = ['-', '–', '—', ':'];

/// Rounds a monetary value to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Amount in millionths of a currency unit. Sums of these are exact and
/// therefore independent of the order they are added in.
pub fn to_micros(value: f64) -> i128 {
    (value * 1_000_000.0).round() as i128
}

/// Rounds millionths to whole cents, half away from zero like `f64::round`.
pub fn micros_to_cents(micros: i128) -> i128 {
    let cents = micros / 10_000;
    let rest = micros % 10_000;
    if rest.abs() * 2 >= 10_000 {
        cents + rest.signum()
    } else {
        cents
    }
}

pub fn cents_to_amount(cents: i128) -> f64 {
    cents as f64 / 100.0
}

/// First `20xx` occurrence anywhere in the text.
pub fn extract_year(text: &str) -> Option<String> {
    YEAR_PATTERN.find(text).map(|m| m.as_str().to_string())
}

/// Strips whitespace (including the non-breaking spaces OCR likes to emit)
/// and turns a decimal comma into a decimal point.
pub fn normalize_amount(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// First numeric token of the normalized text.
pub fn extract_amount(text: &str) -> Option<f64> {
    let normalized = normalize_amount(text);
    AMOUNT_PATTERN
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// A standalone 3-digit income code and the name printed after it, if any.
///
/// `"101 - Заробітна плата"` yields `("101", "Заробітна плата")`.
pub fn extract_code(text: &str) -> Option<(String, String)> {
    let caps = CODE_PATTERN.captures(text)?;
    let code = caps.get(1)?;

    let rest = text[code.end()..].trim_start();
    let rest = rest.strip_prefix(&NAME_SEPARATORS[..]).unwrap_or(rest);

    Some((code.as_str().to_string(), rest.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(9387.08 + 1500.0), 10887.08);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-3.333), -3.33);
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2022"), Some("2022".to_string()));
        assert_eq!(extract_year("за 2021 рік"), Some("2021".to_string()));
        assert_eq!(extract_year("1999"), None);
        assert_eq!(extract_year(""), None);
    }

    #[test]
    fn test_extract_amount_variants() {
        assert_eq!(extract_amount("9387.08"), Some(9387.08));
        assert_eq!(extract_amount("1500,00"), Some(1500.0));
        assert_eq!(extract_amount("12 345,67"), Some(12345.67));
        assert_eq!(extract_amount("12\u{a0}345,67 грн"), Some(12345.67));
        assert_eq!(extract_amount("—"), None);
        assert_eq!(extract_amount("n/a"), None);
    }

    #[test]
    fn test_overlong_amount_is_rejected() {
        let digits = "9".repeat(400);
        assert_eq!(extract_amount(&digits), None);
        assert_eq!(extract_amount(&format!("{},50", digits)), None);
    }

    #[test]
    fn test_micros_round_trip() {
        assert_eq!(to_micros(0.101), 101_000);
        assert_eq!(micros_to_cents(655_000), 66);
        assert_eq!(micros_to_cents(654_999), 65);
        assert_eq!(micros_to_cents(-655_000), -66);
        assert_eq!(cents_to_amount(1_088_708), 10887.08);
    }

    #[test]
    fn test_extract_code_with_name() {
        assert_eq!(
            extract_code("101 - Заробітна плата"),
            Some(("101".to_string(), "Заробітна плата".to_string()))
        );
        assert_eq!(
            extract_code("102 – Премія"),
            Some(("102".to_string(), "Премія".to_string()))
        );
        assert_eq!(
            extract_code("126: Дохід"),
            Some(("126".to_string(), "Дохід".to_string()))
        );
    }

    #[test]
    fn test_extract_code_without_name() {
        assert_eq!(extract_code("101"), Some(("101".to_string(), String::new())));
        assert_eq!(extract_code(" 157 "), Some(("157".to_string(), String::new())));
    }

    #[test]
    fn test_extract_code_rejects_longer_numbers() {
        assert_eq!(extract_code("2022"), None);
        assert_eq!(extract_code("12"), None);
        assert_eq!(extract_code("код"), None);
    }
}
