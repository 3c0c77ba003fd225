use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::ElementRef;

lazy_static! {
    // First decimal number in a price label, thousands separators already removed
    static ref NUMBER_REGEX: Regex = Regex::new(r"(\d+(?:\.\d+)?|\.\d+)").unwrap();

    // "$12.99" anywhere in raw page text
    static ref DOLLAR_AMOUNT_REGEX: Regex = Regex::new(r"\$\s?(\d[\d,]*(?:\.\d+)?)").unwrap();
}

/// Normalize price text like "$4.99", "4.99/lb" or "$1,234.50" into a decimal.
///
/// Returns `None` for empty or non-numeric text ("N/A").
pub fn normalize_price(text: &str) -> Option<Decimal> {
    let cleaned = text.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let number = NUMBER_REGEX.captures(cleaned)?.get(1)?.as_str();
    Decimal::from_str(number).ok()
}

/// First dollar amount found in raw page text
pub fn first_dollar_amount(raw: &str) -> Option<Decimal> {
    DOLLAR_AMOUNT_REGEX
        .captures_iter(raw)
        .filter_map(|cap| cap.get(1))
        .find_map(|m| normalize_price(m.as_str()))
}

/// Collapsed, trimmed text content of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_price_labels() {
        assert_eq!(normalize_price("$4.99"), Some(dec!(4.99)));
        assert_eq!(normalize_price("4.99/lb"), Some(dec!(4.99)));
        assert_eq!(normalize_price("$1,234.50"), Some(dec!(1234.50)));
        assert_eq!(normalize_price("  $12 "), Some(dec!(12)));
        assert_eq!(normalize_price("$.99"), Some(dec!(0.99)));
    }

    #[test]
    fn test_normalize_price_rejects_non_numeric() {
        assert_eq!(normalize_price(""), None);
        assert_eq!(normalize_price("   "), None);
        assert_eq!(normalize_price("N/A"), None);
        assert_eq!(normalize_price("$"), None);
    }

    #[test]
    fn test_first_dollar_amount() {
        let raw = r#"<div>Serving size 2 oz</div><span class="x">$3,049.00</span> $1.00"#;
        assert_eq!(first_dollar_amount(raw), Some(dec!(3049.00)));
        assert_eq!(first_dollar_amount("no prices here"), None);
    }
}
