use regex::Regex;
use std::sync::LazyLock;

static RAW_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("raw amount regex"));
static UI_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)(?:\.([0-9]+))?$").expect("ui amount regex"));

/// Canonical smallest-unit integer string: digits only, no leading zeros.
pub fn parse_raw_amount(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if !RAW_AMOUNT_RE.is_match(trimmed) {
        return Err(format!(
            "must be an integer string of smallest units, got `{trimmed}`"
        ));
    }
    Ok(strip_leading_zeros(trimmed))
}

/// Scales a decimal string by `10^decimals` without floating point.
pub fn scale_ui_amount(value: &str, decimals: u8) -> Result<String, String> {
    let trimmed = value.trim();
    let caps = UI_AMOUNT_RE
        .captures(trimmed)
        .ok_or_else(|| format!("must be a non-negative decimal number, got `{trimmed}`"))?;
    let whole = &caps[1];
    let fraction = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > usize::from(decimals) {
        return Err(format!(
            "`{trimmed}` has more than {decimals} decimal places supported by the token"
        ));
    }
    let mut digits = String::with_capacity(whole.len() + usize::from(decimals));
    digits.push_str(whole);
    digits.push_str(fraction);
    for _ in fraction.len()..usize::from(decimals) {
        digits.push('0');
    }
    Ok(strip_leading_zeros(&digits))
}

pub fn is_zero(amount: &str) -> bool {
    amount.bytes().all(|b| b == b'0')
}

/// Numeric comparison of canonical integer strings of arbitrary length.
pub fn compare_raw(left: &str, right: &str) -> std::cmp::Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

fn strip_leading_zeros(digits: &str) -> String {
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}
