use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds `value` half away from zero and renders exactly `dp` decimal places.
///
/// # Example
///
/// ```
/// assert_eq!(format_fixed(dec!(1234.5678), 4), "1234.5678");
/// assert_eq!(format_fixed(dec!(-3.2), 2), "-3.20");
/// ```
pub fn format_fixed(value: Decimal, dp: u32) -> String {
    let (negative, digits) = rounded_digits(value, dp);
    if negative {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Same as [`format_fixed`] but groups the integer part with `,` every three digits.
///
/// # Example
///
/// ```
/// assert_eq!(format_thousands(dec!(19000000), 0), "19,000,000");
/// ```
pub fn format_thousands(value: Decimal, dp: u32) -> String {
    let (negative, digits) = rounded_digits(value, dp);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let len = int_part.len();
    let mut grouped = String::with_capacity(digits.len() + len / 3 + 1);
    if negative {
        grouped.push('-');
    }

    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if let Some(f) = frac_part {
        grouped.push('.');
        grouped.push_str(f);
    }

    grouped
}

/// 回傳 (是否為負數, 四捨五入後的絕對值字串)，-0 視為正數
fn rounded_digits(value: Decimal, dp: u32) -> (bool, String) {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);
    // 補足小數位數
    rounded.rescale(dp);
    (negative, rounded.to_string())
}

/// Escapes characters that would break a markdown table cell.
pub fn escape_markdown_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}
