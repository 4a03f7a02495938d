//! Locale-aware number and p-value formatting.

use crate::locale::Language;

/// Round a number to N decimals.
pub fn round_to(num: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (num * factor).round() / factor
}

/// Format a number with fixed decimals using the language's decimal and
/// thousands separators.
pub fn format_number(value: f64, decimals: usize, lang: Language) -> String {
    if !value.is_finite() {
        return "–".to_string();
    }
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    // Group the integer digits in threes from the right.
    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (idx, ch) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(lang.thousands_separator());
        }
        grouped.push(*ch);
    }

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(lang.decimal_separator());
        out.push_str(frac);
    }
    out
}

/// Format a p-value, collapsing anything below `threshold` to "<threshold".
pub fn format_p_value(p: f64, decimals: u32, threshold: f64, lang: Language) -> String {
    if p.is_nan() {
        return "-".to_string();
    }
    let rounded = round_to(p, decimals);
    if rounded < threshold {
        return format!("<{}", format_number(threshold, decimals as usize, lang));
    }
    format_number(rounded, decimals as usize, lang)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_locales() {
        assert_eq!(format_number(1234.5, 1, Language::EnUs), "1,234.5");
        assert_eq!(format_number(1234.5, 1, Language::PtBr), "1.234,5");
        assert_eq!(format_number(-7.25, 2, Language::EsEs), "-7,25");
    }

    #[test]
    fn test_format_p_value_threshold() {
        assert_eq!(format_p_value(0.0004, 3, 0.001, Language::EnUs), "<0.001");
        assert_eq!(format_p_value(0.0004, 3, 0.001, Language::PtBr), "<0,001");
        assert_eq!(format_p_value(0.042, 3, 0.001, Language::EnUs), "0.042");
        assert_eq!(format_p_value(f64::NAN, 3, 0.001, Language::EnUs), "-");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(0.9995, 3), 1.0);
    }
}
