//! Numeric literals as they appear in IP-XACT documents.
//!
//! Accepted forms are `0x`/`0X` prefixed hexadecimal and decimal digits with
//! an optional binary multiplier suffix (`k`/`K`, `M`, `G`, `T`, `P`).
//! Anything else, including the empty string, reads as `0`.

use std::str::FromStr;

/// Parse a numeric literal, returning `0` for empty or malformed input.
pub fn parse_literal(text: &str) -> u64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).unwrap_or(0);
    }

    let (digits, multiplier) = split_multiplier(trimmed);
    match digits.trim().parse::<u64>() {
        Ok(value) => value.checked_mul(multiplier).unwrap_or(0),
        Err(_) => 0,
    }
}

fn split_multiplier(text: &str) -> (&str, u64) {
    let Some(last) = text.chars().last() else {
        return (text, 1);
    };
    let shift = match last {
        'k' | 'K' => 10,
        'M' => 20,
        'G' => 30,
        'T' => 40,
        'P' => 50,
        _ => return (text, 1),
    };
    (&text[..text.len() - last.len_utf8()], 1u64 << shift)
}

/// Format a value as lowercase hexadecimal with a `0x` prefix.
pub fn format_hex(value: u64) -> String {
    format!("0x{value:x}")
}

/// Integer conversion that mirrors a lenient `toInt`: malformed text is `0`.
pub fn parse_int_or_zero<T: FromStr + Default>(text: &str) -> T {
    text.trim().parse().unwrap_or_default()
}

/// `base + range - 1`, or `0` when the sum is `0` (both unset).
pub fn last_address(base: u64, range: u64) -> u64 {
    let end = base.wrapping_add(range);
    if end == 0 {
        0
    } else {
        end - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_suffixed_decimal() {
        assert_eq!(parse_literal("0x1A"), 26);
        assert_eq!(parse_literal("0X1a"), 26);
        assert_eq!(parse_literal("4k"), 4096);
        assert_eq!(parse_literal("4K"), 4096);
        assert_eq!(parse_literal("1M"), 1_048_576);
        assert_eq!(parse_literal("2G"), 2 << 30);
        assert_eq!(parse_literal("1T"), 1 << 40);
        assert_eq!(parse_literal("1P"), 1 << 50);
        assert_eq!(parse_literal(" 42 "), 42);
    }

    #[test]
    fn malformed_input_degrades_to_zero() {
        assert_eq!(parse_literal(""), 0);
        assert_eq!(parse_literal("garbage"), 0);
        assert_eq!(parse_literal("0x"), 0);
        assert_eq!(parse_literal("0xZZ"), 0);
        assert_eq!(parse_literal("1m"), 0);
        assert_eq!(parse_literal("k"), 0);
        assert_eq!(parse_literal("-5"), 0);
        assert_eq!(parse_literal("99999999999P"), 0);
    }

    #[test]
    fn formats_lowercase_hex() {
        assert_eq!(format_hex(26), "0x1a");
        assert_eq!(format_hex(0), "0x0");
    }

    #[test]
    fn last_address_arithmetic() {
        assert_eq!(last_address(0, 0x10), 15);
        assert_eq!(last_address(0x100, 0x10), 0x10f);
        assert_eq!(last_address(0, 0), 0);
    }

    #[test]
    fn lenient_int_parsing() {
        assert_eq!(parse_int_or_zero::<i32>("-3"), -3);
        assert_eq!(parse_int_or_zero::<u32>("abc"), 0);
        assert_eq!(parse_int_or_zero::<u32>(" 32 "), 32);
    }
}
