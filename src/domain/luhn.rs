//! Mod-10 (Luhn) check digits.
//!
//! Digits of the payload are indexed from the left starting at zero and the
//! ones at even positions are doubled. For the standard 15-digit payload this
//! matches the textbook right-to-left rule, where the digit next to the check
//! digit is doubled.

/// Computes the check digit for `payload`, the number without its last digit.
///
/// `payload` must consist of ASCII digits only; callers validate first.
pub fn check_digit(payload: &str) -> u8 {
    let sum: u32 = payload
        .bytes()
        .enumerate()
        .map(|(index, byte)| {
            debug_assert!(byte.is_ascii_digit());
            let digit = u32::from(byte - b'0');
            if index % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Returns whether the last digit of `number` is the check digit of the rest.
///
/// Anything that is not a string of at least two ASCII digits is invalid.
pub fn is_valid(number: &str) -> bool {
    if number.len() < 2 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (payload, check) = number.split_at(number.len() - 1);
    check.as_bytes()[0] - b'0' == check_digit(payload)
}
