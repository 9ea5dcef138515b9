//! Internal module for validating JSON number text on the writer side

/// Whether `value` is a valid JSON number per RFC 4627:
/// `-? (0 | [1-9][0-9]*) frac? exp?`
pub(crate) fn is_valid_decimal_number(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;

    if bytes.first() == Some(&b'-') {
        i += 1;
    }

    // Integer part; leading 0 must not be followed by further digits
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
                i += 1;
            }
        }
        _ => return false,
    }

    // Fraction part
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if !matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            return false;
        }
        while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            i += 1;
        }
    }

    // Exponent part
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            return false;
        }
        while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            i += 1;
        }
    }

    i == bytes.len()
}

/// Whether `value` is a hexadecimal number literal: `0[xX][0-9a-fA-F]+`
///
/// A sign, fraction or exponent makes a hex literal invalid, which the
/// mandatory hex digits after the prefix already guarantee.
pub(crate) fn is_valid_hex_number(value: &str) -> bool {
    let rest = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"));
    match rest {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
