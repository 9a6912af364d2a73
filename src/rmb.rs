//! Write amounts of money as upper-case Chinese numerals (大写金额).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ToolError};

const DIGITS: [&str; 10] = ["零", "壹", "贰", "叁", "肆", "伍", "陆", "柒", "捌", "玖"];
const GROUP_UNITS: [&str; 4] = ["", "拾", "佰", "仟"];
const BIG_UNITS: [&str; 6] = ["", "万", "亿", "兆", "京", "垓"];
const DECIMAL_UNITS: [&str; 7] = ["角", "分", "厘", "毫", "丝", "忽", "微"];
const ZERO: &str = "零";

/// Longest integer part the big units can name.
pub const MAX_INTEGER_DIGITS: usize = 21;

static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,30}(\.[0-9]{1,7})?$").expect("amount pattern is valid"));

fn digit(c: char) -> &'static str {
    DIGITS[c.to_digit(10).unwrap_or(0) as usize]
}

fn invalid(value: &str, reason: &str) -> ToolError {
    ToolError::InvalidAmount {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Check that `value` is a plain decimal number this module can spell out.
pub fn validate(value: &str) -> Result<()> {
    if !AMOUNT.is_match(value) {
        return Err(invalid(value, "expected digits with at most 7 decimal places"));
    }
    let integer = value.split('.').next().unwrap_or_default();
    if integer.trim_start_matches('0').len() > MAX_INTEGER_DIGITS {
        return Err(invalid(value, "the integer part has more than 21 digits"));
    }
    Ok(())
}

fn integer_words(integer: &str) -> String {
    let integer = integer.trim_start_matches('0');
    if integer.is_empty() {
        return ZERO.to_string();
    }

    let chars: Vec<char> = integer.chars().collect();
    let mut groups: Vec<&[char]> = chars.rchunks(4).collect();
    groups.reverse();
    let is_zero = |group: &[char]| group.iter().all(|&c| c == '0');

    let mut result: Vec<&str> = Vec::new();
    for (i, &group) in groups.iter().enumerate() {
        if is_zero(group) && i < groups.len() - 1 {
            let more_follow = groups[i + 1..].iter().any(|&g| !is_zero(g));
            if more_follow && result.last() != Some(&ZERO) {
                result.push(ZERO);
            }
            continue;
        }

        let mut words: Vec<&str> = Vec::new();
        let mut pending_zero = false;
        let mut seen_digit = false;
        for (j, &c) in group.iter().enumerate() {
            let unit = group.len() - j - 1;
            if c == '0' {
                pending_zero = true;
                continue;
            }
            if pending_zero && !words.is_empty() {
                words.push(ZERO);
            }
            words.push(digit(c));
            if unit > 0 {
                words.push(GROUP_UNITS[unit]);
            }
            seen_digit = true;
            pending_zero = false;
        }
        if pending_zero && seen_digit {
            words.push(ZERO);
        }

        if !words.is_empty() {
            result.extend(words);
            let big = groups.len() - i - 1;
            if let Some(unit) = BIG_UNITS.get(big) {
                result.push(*unit);
            }
        }
    }

    if result.is_empty() {
        ZERO.to_string()
    } else {
        result.concat()
    }
}

fn fraction_words(fraction: &str) -> String {
    let digits: Vec<char> = fraction.chars().chain(std::iter::repeat('0')).take(DECIMAL_UNITS.len()).collect();
    let Some(last) = digits.iter().rposition(|&c| c != '0') else {
        return String::new();
    };

    let mut result: Vec<&str> = Vec::new();
    for (i, &c) in digits[..=last].iter().enumerate() {
        if c != '0' {
            result.push(digit(c));
            result.push(DECIMAL_UNITS[i]);
        } else if result.last().is_some_and(|w| !DECIMAL_UNITS.contains(w)) {
            result.push(ZERO);
        }
    }
    result.concat()
}

/// Spell out `value`, e.g. `123.45` as `壹佰贰拾叁元肆角伍分`.
pub fn to_upper(value: &str) -> Result<String> {
    let value = value.trim();
    validate(value)?;

    let (integer, fraction) = value.split_once('.').unwrap_or((value, ""));
    let mut text = integer_words(integer);
    text.push('元');
    let fraction = fraction_words(fraction);
    if fraction.is_empty() {
        text.push('整');
    } else {
        text.push_str(&fraction);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spells_common_amounts() {
        assert_eq!(to_upper("123.45").unwrap(), "壹佰贰拾叁元肆角伍分");
        assert_eq!(to_upper("10000").unwrap(), "壹万元整");
        assert_eq!(to_upper("0").unwrap(), "零元整");
        assert_eq!(to_upper("0.50").unwrap(), "零元伍角");
        assert_eq!(to_upper(" 8 ").unwrap(), "捌元整");
    }

    #[test]
    fn zero_groups_collapse_to_one_zero() {
        assert_eq!(to_upper("100000001").unwrap(), "壹亿零壹元整");
        assert_eq!(to_upper("1000000000001").unwrap(), "壹兆零壹元整");
    }

    #[test]
    fn zeros_inside_a_group() {
        assert_eq!(to_upper("1001").unwrap(), "壹仟零壹元整");
        // A group ending in zeros keeps one trailing zero.
        assert_eq!(to_upper("1010").unwrap(), "壹仟零壹拾零元整");
        assert_eq!(to_upper("100").unwrap(), "壹佰零元整");
    }

    #[test]
    fn all_seven_decimal_places() {
        assert_eq!(to_upper("0.1234567").unwrap(), "零元壹角贰分叁厘肆毫伍丝陆忽柒微");
        assert_eq!(to_upper("1.0000001").unwrap(), "壹元壹微");
        assert_eq!(to_upper("2.000").unwrap(), "贰元整");
    }

    #[test]
    fn largest_supported_amount() {
        let text = to_upper("123456789012345678901").unwrap();
        assert!(text.starts_with("壹垓贰仟叁佰肆拾伍京"));
        assert!(text.ends_with("玖佰零壹元整"));
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "1.", ".5", "1.12345678", "-3", "1e5", "１２", "1,000"] {
            assert!(
                matches!(to_upper(bad), Err(ToolError::InvalidAmount { .. })),
                "{bad} should be rejected"
            );
        }
        assert!(to_upper("1234567890123456789012").is_err());
        // Leading zeros do not count towards the limit.
        assert!(to_upper("0001234567890123456789012").is_err());
        assert!(to_upper("000123456789012345678901").is_ok());
    }
}
