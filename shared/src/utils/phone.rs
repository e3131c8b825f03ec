//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Iranian mobile number in international form: +989 followed by 9 digits
static IRAN_MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+989\d{9}$").unwrap()
});

/// Message returned to clients when a phone number fails validation
pub const PHONE_FORMAT_MESSAGE: &str =
    "Phone number must be entered in the format: '+989xxxxxxxxx'. Up to 12 digits allowed.";

/// Maximum accepted length of a phone number field
pub const PHONE_MAX_LENGTH: usize = 13;

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number is a valid Iranian mobile number (`+989xxxxxxxxx`)
///
/// The input is checked as given; callers that accept formatted input should
/// run it through [`normalize_phone_number`] first.
pub fn is_valid_mobile(phone: &str) -> bool {
    phone.len() <= PHONE_MAX_LENGTH && IRAN_MOBILE_REGEX.is_match(phone)
}

/// Mask a phone number for logging (e.g., +98*******6789)
///
/// Keeps the country prefix and the last four digits of the normalized number.
pub fn mask_phone_number(phone: &str) -> String {
    let digits = normalize_phone_number(phone);
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }

    let last_digits = &digits[digits.len() - 4..];
    if digits.starts_with('+') && digits.len() > 7 {
        format!("{}{}{}", &digits[..3], "*".repeat(digits.len() - 7), last_digits)
    } else {
        format!("{}{}", "*".repeat(digits.len() - 4), last_digits)
    }
}
